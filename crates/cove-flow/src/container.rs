//! # Container Registry
//!
//! Capacity-bounded containers of workflow instances: a scholarship
//! program, an auction lot, a proposal, a game. A container is created by
//! an administrator and lives until the process ends — there is no
//! deletion. Each container owns its own instance count; no global
//! counter exists anywhere in the engine.
//!
//! ## Invariants
//!
//! - `instance_count` never exceeds `capacity`.
//! - Once `active` is false, no new instances may be created; existing
//!   instances may still be finalized.
//! - Only the administrator may toggle the active flag.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use cove_core::{ContainerId, EngineError, PrincipalId, Timestamp};

/// A capacity-bounded collection of workflow instances.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Container {
    /// Opaque container identifier.
    pub id: ContainerId,
    /// The administrator: the only principal who may toggle or finalize.
    pub admin: PrincipalId,
    /// Plain (non-confidential) display name.
    pub name: String,
    /// Plain description.
    pub description: String,
    /// Maximum number of workflow instances.
    pub capacity: u32,
    /// Current number of workflow instances.
    pub instance_count: u32,
    /// Whether new submissions are accepted.
    pub active: bool,
    /// Creation time.
    pub created_at: Timestamp,
}

impl Container {
    /// Whether the container has room for another instance.
    pub fn has_capacity(&self) -> bool {
        self.instance_count < self.capacity
    }
}

/// The table of all containers.
#[derive(Debug, Default)]
pub struct ContainerRegistry {
    containers: HashMap<ContainerId, Container>,
}

impl ContainerRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self {
            containers: HashMap::new(),
        }
    }

    /// Create a container. Always succeeds: count zero, active.
    pub fn create(
        &mut self,
        admin: PrincipalId,
        name: impl Into<String>,
        description: impl Into<String>,
        capacity: u32,
    ) -> ContainerId {
        let id = ContainerId::new();
        let container = Container {
            id,
            admin,
            name: name.into(),
            description: description.into(),
            capacity,
            instance_count: 0,
            active: true,
            created_at: Timestamp::now(),
        };
        tracing::debug!(container = %id, %admin, capacity, "container created");
        self.containers.insert(id, container);
        id
    }

    /// Look up a container.
    ///
    /// # Errors
    ///
    /// `InvalidReference` if the id does not resolve.
    pub fn get(&self, id: ContainerId) -> Result<&Container, EngineError> {
        self.containers
            .get(&id)
            .ok_or_else(|| EngineError::InvalidReference(id.to_string()))
    }

    /// Flip the active flag. Admin-only; returns the new flag.
    pub fn toggle(&mut self, id: ContainerId, caller: PrincipalId) -> Result<bool, EngineError> {
        let container = self
            .containers
            .get_mut(&id)
            .ok_or_else(|| EngineError::InvalidReference(id.to_string()))?;
        if caller != container.admin {
            return Err(EngineError::Unauthorized(caller));
        }
        container.active = !container.active;
        tracing::debug!(container = %id, active = container.active, "container toggled");
        Ok(container.active)
    }

    /// Check that a container accepts a new instance right now, without
    /// reserving anything.
    pub fn ensure_open(&self, id: ContainerId) -> Result<(), EngineError> {
        let container = self.get(id)?;
        if !container.active {
            return Err(EngineError::ProgramClosed(id));
        }
        if !container.has_capacity() {
            return Err(EngineError::ProgramFull(id, container.capacity));
        }
        Ok(())
    }

    /// Count a new instance against the capacity. Invoked by the workflow
    /// layer on submission, after the instance's inputs exist.
    pub fn add_instance(&mut self, id: ContainerId) -> Result<(), EngineError> {
        self.ensure_open(id)?;
        let container = self
            .containers
            .get_mut(&id)
            .ok_or_else(|| EngineError::InvalidReference(id.to_string()))?;
        container.instance_count += 1;
        Ok(())
    }

    /// Number of containers.
    pub fn len(&self) -> usize {
        self.containers.len()
    }

    /// Whether no container exists yet.
    pub fn is_empty(&self) -> bool {
        self.containers.is_empty()
    }

    /// Iterate over all containers.
    pub fn iter(&self) -> impl Iterator<Item = &Container> {
        self.containers.values()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn registry_with(capacity: u32) -> (ContainerRegistry, ContainerId, PrincipalId) {
        let mut reg = ContainerRegistry::new();
        let admin = PrincipalId::new();
        let id = reg.create(admin, "spring-scholarships", "Spring 2026 round", capacity);
        (reg, id, admin)
    }

    #[test]
    fn test_create_starts_empty_and_active() {
        let (reg, id, admin) = registry_with(3);
        let c = reg.get(id).unwrap();
        assert_eq!(c.instance_count, 0);
        assert!(c.active);
        assert_eq!(c.admin, admin);
    }

    #[test]
    fn test_capacity_enforced() {
        let (mut reg, id, _) = registry_with(2);
        reg.add_instance(id).unwrap();
        reg.add_instance(id).unwrap();
        assert_eq!(
            reg.add_instance(id),
            Err(EngineError::ProgramFull(id, 2))
        );
        assert_eq!(reg.get(id).unwrap().instance_count, 2);
    }

    #[test]
    fn test_toggle_is_admin_only() {
        let (mut reg, id, admin) = registry_with(1);
        let outsider = PrincipalId::new();
        assert_eq!(
            reg.toggle(id, outsider),
            Err(EngineError::Unauthorized(outsider))
        );
        assert_eq!(reg.toggle(id, admin), Ok(false));
        assert_eq!(reg.toggle(id, admin), Ok(true));
    }

    #[test]
    fn test_inactive_container_rejects_instances() {
        let (mut reg, id, admin) = registry_with(5);
        reg.toggle(id, admin).unwrap();
        assert_eq!(reg.add_instance(id), Err(EngineError::ProgramClosed(id)));
        assert_eq!(reg.get(id).unwrap().instance_count, 0);
    }

    #[test]
    fn test_unknown_container_is_invalid_reference() {
        let reg = ContainerRegistry::new();
        let id = ContainerId::new();
        assert!(matches!(
            reg.get(id),
            Err(EngineError::InvalidReference(_))
        ));
    }
}
