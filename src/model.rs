//! Car records and the payloads that create or change them.

use serde::{Deserialize, Serialize};

/// Store-assigned identifier of a car record. Never negative.
pub type CarId = i64;

/// One stored car. This is also the on-disk and over-the-wire shape.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Car {
    pub id: CarId,
    pub make: String,
    pub model: String,
    pub mileage: u64,
    pub number_of_owners: u64,
}

impl Car {
    pub fn from_fields(id: CarId, fields: CarFields) -> Self {
        Self {
            id,
            make: fields.make,
            model: fields.model,
            mileage: fields.mileage,
            number_of_owners: fields.number_of_owners,
        }
    }

    /// Applies the first field present in `patch`, checked in the order
    /// make, model, mileage, number_of_owners. Remaining fields are ignored.
    ///
    /// Returns `false` when the patch carried no field at all.
    pub fn apply_patch(&mut self, patch: CarPatch) -> bool {
        if let Some(make) = patch.make {
            self.make = make;
        } else if let Some(model) = patch.model {
            self.model = model;
        } else if let Some(mileage) = patch.mileage {
            self.mileage = mileage;
        } else if let Some(number_of_owners) = patch.number_of_owners {
            self.number_of_owners = number_of_owners;
        } else {
            return false;
        }
        true
    }
}

/// Every caller-supplied field of a car; used by create and full replace.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CarFields {
    pub make: String,
    pub model: String,
    pub mileage: u64,
    pub number_of_owners: u64,
}

impl CarFields {
    pub fn new(
        make: impl Into<String>,
        model: impl Into<String>,
        mileage: u64,
        number_of_owners: u64,
    ) -> Self {
        Self {
            make: make.into(),
            model: model.into(),
            mileage,
            number_of_owners,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CarPatch {
    #[serde(default)]
    pub make: Option<String>,
    #[serde(default)]
    pub model: Option<String>,
    #[serde(default)]
    pub mileage: Option<u64>,
    #[serde(default)]
    pub number_of_owners: Option<u64>,
}

impl CarPatch {
    pub fn is_empty(&self) -> bool {
        self.make.is_none()
            && self.model.is_none()
            && self.mileage.is_none()
            && self.number_of_owners.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn focus() -> Car {
        Car::from_fields(0, CarFields::new("Ford", "Focus", 1000, 1))
    }

    #[test]
    fn patch_applies_only_the_highest_priority_field() {
        let mut car = focus();
        let applied = car.apply_patch(CarPatch {
            make: Some("Kia".to_string()),
            mileage: Some(5000),
            ..CarPatch::default()
        });

        assert!(applied);
        assert_eq!(car.make, "Kia");
        assert_eq!(car.mileage, 1000);
    }

    #[test]
    fn patch_falls_through_to_later_fields() {
        let mut car = focus();
        car.apply_patch(CarPatch {
            mileage: Some(7500),
            number_of_owners: Some(3),
            ..CarPatch::default()
        });
        assert_eq!(car.mileage, 7500);
        assert_eq!(car.number_of_owners, 1);

        car.apply_patch(CarPatch {
            number_of_owners: Some(2),
            ..CarPatch::default()
        });
        assert_eq!(car.number_of_owners, 2);
    }

    #[test]
    fn empty_patch_changes_nothing() {
        let mut car = focus();
        assert!(CarPatch::default().is_empty());
        assert!(!car.apply_patch(CarPatch::default()));
        assert_eq!(car, focus());
    }

    #[test]
    fn car_serializes_with_snake_case_fields() {
        let json = serde_json::to_value(focus()).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "id": 0,
                "make": "Ford",
                "model": "Focus",
                "mileage": 1000,
                "number_of_owners": 1
            })
        );
    }
}
