//! Service registry
//!
//! Manages service lifecycle and provides typed service lookup.

use std::cmp::Reverse;
use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::RwLock;

use crate::service::{Service, ServiceError, ServiceHealth, ServiceId, ServiceResult};

/// Service wrapper with metadata
struct ServiceEntry {
    /// The service instance
    service: Arc<dyn Service>,
    /// Registration order (for ordered startup/shutdown)
    order: usize,
}

/// Service registry - owns every engine service
pub struct ServiceRegistry {
    /// Registered services
    services: RwLock<HashMap<ServiceId, ServiceEntry>>,
    /// Registration counter
    next_order: RwLock<usize>,
}

impl ServiceRegistry {
    /// Create a new empty registry
    pub fn new() -> Self {
        Self {
            services: RwLock::new(HashMap::new()),
            next_order: RwLock::new(0),
        }
    }

    /// Register a service
    pub fn register(&self, service: Arc<dyn Service>) -> ServiceResult<()> {
        let id = service.id().clone();
        let mut services = self.services.write();

        if services.contains_key(&id) {
            return Err(ServiceError::AlreadyExists(id.to_string()));
        }

        let mut next_order = self.next_order.write();
        let entry = ServiceEntry {
            service,
            order: *next_order,
        };
        *next_order += 1;

        log::debug!("Registered service {}", id);
        services.insert(id, entry);
        Ok(())
    }

    /// Unregister a service, stopping it first if it is running
    pub fn unregister(&self, id: &ServiceId) -> ServiceResult<Arc<dyn Service>> {
        let entry = self
            .services
            .write()
            .remove(id)
            .ok_or_else(|| ServiceError::NotFound(id.to_string()))?;

        if entry.service.state().is_operational() {
            if let Err(e) = entry.service.stop() {
                log::warn!("Failed to stop service {} during unregister: {}", id, e);
            }
        }

        Ok(entry.service)
    }

    /// Get a service by ID
    pub fn get(&self, id: &ServiceId) -> Option<Arc<dyn Service>> {
        self.services.read().get(id).map(|e| e.service.clone())
    }

    /// Get a typed service handle
    pub fn get_typed<T: Service>(&self, id: &ServiceId) -> ServiceResult<Arc<T>> {
        let service = self
            .get(id)
            .ok_or_else(|| ServiceError::NotFound(id.to_string()))?;
        service
            .into_any()
            .downcast::<T>()
            .map_err(|_| ServiceError::TypeMismatch(id.to_string()))
    }

    /// Find the first service of type `T`, whatever its ID
    pub fn find<T: Service>(&self) -> Option<Arc<T>> {
        let services = self.services.read();
        let mut entries: Vec<&ServiceEntry> = services.values().collect();
        entries.sort_by_key(|e| e.order);
        entries
            .into_iter()
            .find(|e| e.service.as_any().is::<T>())
            .and_then(|e| e.service.clone().into_any().downcast::<T>().ok())
    }

    fn ordered(&self) -> Vec<(usize, Arc<dyn Service>)> {
        self.services
            .read()
            .values()
            .map(|e| (e.order, e.service.clone()))
            .collect()
    }

    /// Start all registered services (in registration order)
    pub fn start_all(&self) -> ServiceResult<()> {
        let mut ordered = self.ordered();
        ordered.sort_by_key(|(order, _)| *order);

        for (_, service) in ordered {
            if !service.state().is_operational() {
                service.start()?;
                log::info!("Service {} started", service.id());
            }
        }

        Ok(())
    }

    /// Stop all registered services (in reverse registration order)
    ///
    /// Every service is asked to stop even if an earlier one fails; the first
    /// error is returned.
    pub fn stop_all(&self) -> ServiceResult<()> {
        let mut ordered = self.ordered();
        ordered.sort_by_key(|(order, _)| Reverse(*order));

        let mut first_error = None;
        for (_, service) in ordered {
            if service.state().is_operational() {
                match service.stop() {
                    Ok(()) => log::info!("Service {} stopped", service.id()),
                    Err(e) => {
                        log::error!("Failed to stop service {}: {}", service.id(), e);
                        first_error.get_or_insert(e);
                    }
                }
            }
        }

        first_error.map_or(Ok(()), Err)
    }

    /// Get health status of all services
    pub fn health_all(&self) -> HashMap<ServiceId, ServiceHealth> {
        self.services
            .read()
            .iter()
            .map(|(id, entry)| (id.clone(), entry.service.health()))
            .collect()
    }

    /// Get all service IDs in registration order
    pub fn service_ids(&self) -> Vec<ServiceId> {
        let services = self.services.read();
        let mut ids: Vec<(usize, ServiceId)> = services
            .iter()
            .map(|(id, entry)| (entry.order, id.clone()))
            .collect();
        ids.sort_by_key(|(order, _)| *order);
        ids.into_iter().map(|(_, id)| id).collect()
    }

    /// Get number of registered services
    pub fn len(&self) -> usize {
        self.services.read().len()
    }

    /// Check if registry is empty
    pub fn is_empty(&self) -> bool {
        self.services.read().is_empty()
    }

    /// Check if a service exists
    pub fn contains(&self, id: &ServiceId) -> bool {
        self.services.read().contains_key(id)
    }
}

impl Default for ServiceRegistry {
    fn default() -> Self {
        Self::new()
    }
}
