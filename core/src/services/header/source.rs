use std::collections::HashMap;

/// Read access to request headers. Lookups are case-insensitive on the name.
pub trait HeaderSource {
    /// All values sent for `name`, in arrival order. Empty when absent.
    fn header_values(&self, name: &str) -> Vec<String>;
}

impl HeaderSource for HashMap<String, Vec<String>> {
    fn header_values(&self, name: &str) -> Vec<String> {
        self.iter()
            .filter(|(key, _)| key.eq_ignore_ascii_case(name))
            .flat_map(|(_, values)| values.iter().cloned())
            .collect()
    }
}

impl HeaderSource for Vec<(String, String)> {
    fn header_values(&self, name: &str) -> Vec<String> {
        self.iter()
            .filter(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.clone())
            .collect()
    }
}
