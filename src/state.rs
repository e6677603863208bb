use std::sync::Arc;
use tokio::sync::RwLock;

use crate::clock::{Clock, SystemClock};
use crate::config::Config;
use crate::db::Store;
use crate::services::{
    AttendanceService, AuthService, EmployeeService, PaymentService, SeaOrmAttendanceService,
    SeaOrmAuthService, SeaOrmEmployeeService, SeaOrmPaymentService, TokenService,
};

#[derive(Clone)]
pub struct SharedState {
    pub config: Arc<RwLock<Config>>,

    pub store: Store,

    /// Source of "today" for everything that touches the attendance aggregate.
    pub clock: Arc<dyn Clock>,

    pub auth_service: Arc<dyn AuthService>,

    pub employee_service: Arc<dyn EmployeeService>,

    pub attendance_service: Arc<dyn AttendanceService>,

    pub payment_service: Arc<dyn PaymentService>,
}

impl SharedState {
    pub async fn new(config: Config) -> anyhow::Result<Self> {
        Self::with_clock(config, Arc::new(SystemClock)).await
    }

    /// Builds the state with an explicit source of "today".
    pub async fn with_clock(config: Config, clock: Arc<dyn Clock>) -> anyhow::Result<Self> {
        let store = Store::with_pool_options(
            &config.general.database_path,
            config.general.max_db_connections,
            config.general.min_db_connections,
        )
        .await?;

        let tokens = TokenService::new(
            &config.security.resolve_jwt_secret(),
            config.security.token_ttl_days,
        );

        let auth_service = Arc::new(SeaOrmAuthService::new(
            store.clone(),
            tokens,
            config.security.clone(),
        )) as Arc<dyn AuthService>;

        let employee_service =
            Arc::new(SeaOrmEmployeeService::new(store.clone())) as Arc<dyn EmployeeService>;

        let attendance_service =
            Arc::new(SeaOrmAttendanceService::new(store.clone(), clock.clone()))
                as Arc<dyn AttendanceService>;

        let payment_service =
            Arc::new(SeaOrmPaymentService::new(store.clone())) as Arc<dyn PaymentService>;

        Ok(Self {
            config: Arc::new(RwLock::new(config)),
            store,
            clock,
            auth_service,
            employee_service,
            attendance_service,
            payment_service,
        })
    }
}
