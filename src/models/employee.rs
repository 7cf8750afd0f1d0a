//! Employee master data as seen by the engine.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// An employee resolved from the surrounding system's master data.
///
/// The engine only reads employees; a session whose email has no employee
/// is left untouched.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Employee {
    /// The organisation's employee code.
    pub emp_code: String,
    /// The employee's email, used as the attendance key.
    pub emp_email: String,
    /// The employee's full name.
    pub full_name: String,
    /// Length of the employee's configured shift, if any.
    #[serde(default)]
    pub standard_hours: Option<Decimal>,
}

impl Employee {
    /// Creates an employee without a configured shift length.
    ///
    /// # Examples
    ///
    /// ```
    /// use compoff_engine::models::Employee;
    ///
    /// let employee = Employee::new("EMP001", "asha@example.com", "Asha Rao");
    /// assert_eq!(employee.emp_code, "EMP001");
    /// assert!(employee.standard_hours.is_none());
    /// ```
    pub fn new(
        emp_code: impl Into<String>,
        emp_email: impl Into<String>,
        full_name: impl Into<String>,
    ) -> Self {
        Self {
            emp_code: emp_code.into(),
            emp_email: emp_email.into(),
            full_name: full_name.into(),
            standard_hours: None,
        }
    }
}
