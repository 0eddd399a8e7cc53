use std::time::Duration;

/// Deadlines governing one search. Spec section 4.F requires a per-call
/// deadline and a global deadline but leaves the defaults unspecified
/// (unlike the handoff timeouts, which section 6 enumerates); these mirror
/// the health monitor's probe timeout and the handoff prepare timeout as
/// the closest analogues already in the option table.
#[derive(Debug, Clone, Copy)]
pub struct RouterConfig {
    pub per_call_timeout: Duration,
    pub global_deadline: Duration,
}

impl Default for RouterConfig {
    fn default() -> Self {
        Self {
            per_call_timeout: Duration::from_millis(3000),
            global_deadline: Duration::from_millis(5000),
        }
    }
}
