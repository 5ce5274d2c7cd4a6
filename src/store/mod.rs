//! The authoritative car collection.
//!
//! Records live in a table keyed by a monotonically increasing id, so deleting
//! a record never renumbers the others. Every mutation is applied to a copy of
//! the table, the copy is saved through [`SnapshotStorage`], and only then is
//! it swapped in. A failed save leaves both memory and disk as they were.

pub mod error;

use crate::model::{Car, CarFields, CarId, CarPatch};
use crate::storage::{JsonFileStorage, SnapshotStorage};
use error::{Result, StoreError};
use std::collections::BTreeMap;
use std::path::Path;
use tokio::sync::{RwLock, RwLockWriteGuard};
use tracing::{debug, error};

#[derive(Debug, Clone)]
struct CarTable {
    cars: BTreeMap<CarId, Car>,
    /// `None` once `CarId::MAX` has been handed out.
    next_id: Option<CarId>,
}

impl CarTable {
    fn from_records(records: Vec<Car>) -> Self {
        let cars: BTreeMap<CarId, Car> = records.into_iter().map(|car| (car.id, car)).collect();
        let next_id = match cars.keys().next_back() {
            Some(last) => last.checked_add(1),
            None => Some(0),
        };
        Self { cars, next_id }
    }

    fn allocate_id(&mut self) -> Result<CarId> {
        let id = self.next_id.ok_or(StoreError::IdsExhausted)?;
        self.next_id = id.checked_add(1);
        Ok(id)
    }

    fn snapshot(&self) -> Vec<Car> {
        self.cars.values().cloned().collect()
    }
}

pub struct CarStore {
    table: RwLock<CarTable>,
    storage: Box<dyn SnapshotStorage>,
}

impl CarStore {
    /// Opens the JSON file at `path`, creating an empty one if needed.
    pub async fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let storage = JsonFileStorage::open(path).await?;
        Self::with_storage(storage).await
    }

    pub async fn with_storage<S>(storage: S) -> Result<Self>
    where
        S: SnapshotStorage + 'static,
    {
        let records = storage.load().await?;
        let table = CarTable::from_records(records);
        debug!(
            records = table.cars.len(),
            next_id = ?table.next_id,
            "car store initialized"
        );
        Ok(Self {
            table: RwLock::new(table),
            storage: Box::new(storage),
        })
    }

    pub async fn create(&self, fields: CarFields) -> Result<Car> {
        let mut table = self.table.write().await;
        let mut candidate = table.clone();

        let car = Car::from_fields(candidate.allocate_id()?, fields);
        candidate.cars.insert(car.id, car.clone());

        self.commit(&mut table, candidate).await?;
        debug!(id = car.id, records = table.cars.len(), "car created");
        Ok(car)
    }

    pub async fn get(&self, id: CarId) -> Result<Car> {
        self.table
            .read()
            .await
            .cars
            .get(&id)
            .cloned()
            .ok_or(StoreError::NotFound(id))
    }

    /// All records in ascending id order, which is creation order.
    pub async fn list(&self) -> Vec<Car> {
        self.table.read().await.snapshot()
    }

    pub async fn len(&self) -> usize {
        self.table.read().await.cars.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    /// Replaces every field of an existing record; the id is kept.
    pub async fn update(&self, id: CarId, fields: CarFields) -> Result<Car> {
        let mut table = self.table.write().await;
        if !table.cars.contains_key(&id) {
            return Err(StoreError::NotFound(id));
        }

        let mut candidate = table.clone();
        let car = Car::from_fields(id, fields);
        candidate.cars.insert(id, car.clone());

        self.commit(&mut table, candidate).await?;
        debug!(id, "car replaced");
        Ok(car)
    }

    /// Applies at most one field of `patch`; see [`Car::apply_patch`] for
    /// the priority order. An empty patch is not persisted.
    pub async fn partial_update(&self, id: CarId, patch: CarPatch) -> Result<Car> {
        let mut table = self.table.write().await;
        let Some(current) = table.cars.get(&id) else {
            return Err(StoreError::NotFound(id));
        };

        let mut car = current.clone();
        if !car.apply_patch(patch) {
            return Ok(car);
        }

        let mut candidate = table.clone();
        candidate.cars.insert(id, car.clone());

        self.commit(&mut table, candidate).await?;
        debug!(id, "car patched");
        Ok(car)
    }

    pub async fn delete(&self, id: CarId) -> Result<Car> {
        let mut table = self.table.write().await;
        if !table.cars.contains_key(&id) {
            return Err(StoreError::NotFound(id));
        }

        let mut candidate = table.clone();
        let removed = candidate
            .cars
            .remove(&id)
            .ok_or(StoreError::NotFound(id))?;

        self.commit(&mut table, candidate).await?;
        debug!(id, records = table.cars.len(), "car deleted");
        Ok(removed)
    }

    async fn commit(
        &self,
        table: &mut RwLockWriteGuard<'_, CarTable>,
        candidate: CarTable,
    ) -> Result<()> {
        if let Err(err) = self.storage.save(&candidate.snapshot()).await {
            error!(error = %err, "failed to persist cars, mutation discarded");
            return Err(err);
        }
        **table = candidate;
        Ok(())
    }
}
