pub mod authorization;
pub use authorization::{ADMIN_ONLY, ANY_ROLE, Denial, authorize, authorize_self_or_admin};

pub mod token;
pub use token::{Claims, CurrentUser, TokenError, TokenService};

pub mod auth_service;
pub mod auth_service_impl;
pub use auth_service::{AuthError, AuthResult, AuthService, SignupInput};
pub use auth_service_impl::SeaOrmAuthService;

pub mod employee_service;
pub mod employee_service_impl;
pub use employee_service::{CreateEmployee, EmployeeError, EmployeeService};
pub use employee_service_impl::SeaOrmEmployeeService;

pub mod attendance_service;
pub mod attendance_service_impl;
pub use attendance_service::{
    AttendanceError, AttendanceInput, AttendanceQuery, AttendanceService, AttendanceUpdate,
    BulkFailure, BulkOutcome, MarkAttendance, Recorded, SummaryQuery,
};
pub use attendance_service_impl::SeaOrmAttendanceService;

pub mod payment_service;
pub mod payment_service_impl;
pub use payment_service::{CreatePayment, PaymentError, PaymentService};
pub use payment_service_impl::SeaOrmPaymentService;
