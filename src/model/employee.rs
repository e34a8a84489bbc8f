use once_cell::sync::Lazy;
use std::collections::HashMap;

#[derive(Debug, Clone)]
pub struct Employee {
    pub citizen_id: String,
    pub name: String,
}

/// Known employees keyed by citizen ID (cédula).
#[derive(Debug, Default)]
pub struct EmployeeDirectory {
    by_citizen_id: HashMap<String, Employee>,
}

static FIXTURE: Lazy<EmployeeDirectory> = Lazy::new(|| {
    EmployeeDirectory::from_employees([
        Employee {
            citizen_id: "1234567890".into(),
            name: "Juan Pérez".into(),
        },
        Employee {
            citizen_id: "9876543210".into(),
            name: "María García".into(),
        },
    ])
});

impl EmployeeDirectory {
    pub fn from_employees(employees: impl IntoIterator<Item = Employee>) -> Self {
        Self {
            by_citizen_id: employees
                .into_iter()
                .map(|e| (e.citizen_id.clone(), e))
                .collect(),
        }
    }

    /// The built-in roster the seed slips belong to.
    pub fn fixture() -> &'static EmployeeDirectory {
        &FIXTURE
    }

    pub fn get(&self, citizen_id: &str) -> Option<&Employee> {
        self.by_citizen_id.get(citizen_id)
    }

    /// Directory name, or the citizen ID itself for unknown employees.
    pub fn display_name<'a>(&'a self, citizen_id: &'a str) -> &'a str {
        self.get(citizen_id)
            .map(|e| e.name.as_str())
            .unwrap_or(citizen_id)
    }
}
