//! Per-device lifecycle: `Uninitialized -> Active -> Draining -> Destroyed`.

use std::fmt;

use serde::Serialize;

use crate::error::RegistryError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DeviceState {
    Uninitialized,
    Active,
    Draining,
    Destroyed,
}

impl DeviceState {
    /// Checks that `self -> to` is a legal edge and returns `to`.
    ///
    /// `Draining -> Active` is the rollback taken when teardown is refused.
    pub fn transition(self, to: DeviceState) -> Result<DeviceState, RegistryError> {
        use DeviceState::*;
        match (self, to) {
            (Uninitialized, Active)
            | (Active, Draining)
            | (Draining, Active)
            | (Draining, Destroyed) => Ok(to),
            (from, to) => Err(RegistryError::IllegalTransition { from, to }),
        }
    }
}

impl fmt::Display for DeviceState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            DeviceState::Uninitialized => "uninitialized",
            DeviceState::Active => "active",
            DeviceState::Draining => "draining",
            DeviceState::Destroyed => "destroyed",
        };
        f.write_str(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_forward_path() {
        let state = DeviceState::Uninitialized;
        let state = state.transition(DeviceState::Active).unwrap();
        let state = state.transition(DeviceState::Draining).unwrap();
        let state = state.transition(DeviceState::Destroyed).unwrap();
        assert_eq!(state, DeviceState::Destroyed);
    }

    #[test]
    fn test_illegal_edges() {
        assert_eq!(
            DeviceState::Active.transition(DeviceState::Destroyed),
            Err(RegistryError::IllegalTransition {
                from: DeviceState::Active,
                to: DeviceState::Destroyed,
            })
        );
        assert!(DeviceState::Destroyed.transition(DeviceState::Active).is_err());
        assert!(DeviceState::Uninitialized.transition(DeviceState::Draining).is_err());
    }
}
