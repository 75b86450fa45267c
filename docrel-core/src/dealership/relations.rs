//! Dealership relationship resolution
//!
//! | relation              | authoritative side          | lookup                    |
//! |-----------------------|-----------------------------|---------------------------|
//! | Dealer.cars           | `Car.dealerID`              | cars referencing dealer   |
//! | Dealer.salespeople    | `Salesperson.dealerID`      | people referencing dealer |
//! | Car.dealer            | `Car.dealerID`              | re-read car, then dealer  |
//! | Salesperson.dealer    | `Salesperson.dealerID`      | re-read person, then dealer |
//! | Salesperson.cars      | `Salesperson.carIDs`        | re-read person, then cars |
//! | Car.salespeople       | `Salesperson.carIDs`        | people whose list has car |
//!
//! Each accessor runs only when asked for. Parents are taken in external form and
//! are not re-validated beyond parsing their id.

use std::str::FromStr;

use futures::future::try_join_all;

use super::model::{Car, Dealer, Salesperson};
use super::records::{CarDoc, DealerDoc, SalespersonDoc, CAR_IDS_FIELD, DEALER_FIELD};
use crate::error::Result;
use crate::id::ObjectId;
use crate::mapper::{parse_external, Records};
use crate::relation::{containing, listed, referenced, referencing};
use crate::validation::ValidationError;

/// Relations reachable from a dealer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DealerRelation {
    Cars,
    Salespeople,
}

/// Relations reachable from a car
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CarRelation {
    Dealer,
    Salespeople,
}

/// Relations reachable from a salesperson
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SalespersonRelation {
    Cars,
    Dealer,
}

impl FromStr for DealerRelation {
    type Err = ValidationError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "cars" => Ok(Self::Cars),
            "salespeople" => Ok(Self::Salespeople),
            other => Err(ValidationError::InvalidVariant {
                value: other.to_owned(),
            }),
        }
    }
}

impl FromStr for CarRelation {
    type Err = ValidationError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "dealer" => Ok(Self::Dealer),
            "salespeople" => Ok(Self::Salespeople),
            other => Err(ValidationError::InvalidVariant {
                value: other.to_owned(),
            }),
        }
    }
}

impl FromStr for SalespersonRelation {
    type Err = ValidationError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "cars" => Ok(Self::Cars),
            "dealer" => Ok(Self::Dealer),
            other => Err(ValidationError::InvalidVariant {
                value: other.to_owned(),
            }),
        }
    }
}

fn handle_of(external: &str) -> Result<ObjectId> {
    Ok(parse_external("id", external)?.handle())
}

/// On-demand relation accessors over the three dealership collections.
#[derive(Clone)]
pub struct DealershipRelations {
    dealers: Records<DealerDoc>,
    cars: Records<CarDoc>,
    salespeople: Records<SalespersonDoc>,
}

impl DealershipRelations {
    pub fn new(
        dealers: Records<DealerDoc>,
        cars: Records<CarDoc>,
        salespeople: Records<SalespersonDoc>,
    ) -> Self {
        Self {
            dealers,
            cars,
            salespeople,
        }
    }

    pub async fn dealer_cars(&self, dealer: &Dealer) -> Result<Vec<Car>> {
        let id = handle_of(&dealer.id)?;
        let cars = referencing(&self.cars, DEALER_FIELD, id).await?;
        Ok(cars.into_iter().map(Car::from).collect())
    }

    pub async fn dealer_salespeople(&self, dealer: &Dealer) -> Result<Vec<Salesperson>> {
        let id = handle_of(&dealer.id)?;
        let people = referencing(&self.salespeople, DEALER_FIELD, id).await?;
        Ok(people.into_iter().map(Salesperson::from).collect())
    }

    /// Cars in the salesperson's list, in list order with repeats.
    pub async fn salesperson_cars(&self, salesperson: &Salesperson) -> Result<Vec<Car>> {
        let id = handle_of(&salesperson.id)?;
        let Some(record) = self.salespeople.get(id).await? else {
            return Ok(Vec::new());
        };
        let cars = listed(&self.cars, &record.body.car_ids).await?;
        Ok(cars.into_iter().map(Car::from).collect())
    }

    pub async fn salesperson_dealer(&self, salesperson: &Salesperson) -> Result<Option<Dealer>> {
        let id = handle_of(&salesperson.id)?;
        let dealer_id = self.salespeople.get(id).await?.and_then(|r| r.body.dealer_id);
        Ok(referenced(&self.dealers, dealer_id).await?.map(Dealer::from))
    }

    pub async fn car_salespeople(&self, car: &Car) -> Result<Vec<Salesperson>> {
        let id = handle_of(&car.id)?;
        let people = containing(&self.salespeople, CAR_IDS_FIELD, id).await?;
        Ok(people.into_iter().map(Salesperson::from).collect())
    }

    pub async fn car_dealer(&self, car: &Car) -> Result<Option<Dealer>> {
        let id = handle_of(&car.id)?;
        let dealer_id = self.cars.get(id).await?.and_then(|r| r.body.dealer_id);
        Ok(referenced(&self.dealers, dealer_id).await?.map(Dealer::from))
    }

    /// Fill the requested relation fields of `dealer`.
    pub async fn expand_dealer(&self, mut dealer: Dealer, include: &[DealerRelation]) -> Result<Dealer> {
        for relation in include {
            match relation {
                DealerRelation::Cars => dealer.cars = Some(self.dealer_cars(&dealer).await?),
                DealerRelation::Salespeople => {
                    dealer.salespeople = Some(self.dealer_salespeople(&dealer).await?)
                }
            }
        }
        Ok(dealer)
    }

    pub async fn expand_car(&self, mut car: Car, include: &[CarRelation]) -> Result<Car> {
        for relation in include {
            match relation {
                CarRelation::Dealer => car.dealer = Some(self.car_dealer(&car).await?),
                CarRelation::Salespeople => car.salespeople = Some(self.car_salespeople(&car).await?),
            }
        }
        Ok(car)
    }

    pub async fn expand_salesperson(
        &self,
        mut salesperson: Salesperson,
        include: &[SalespersonRelation],
    ) -> Result<Salesperson> {
        for relation in include {
            match relation {
                SalespersonRelation::Cars => {
                    salesperson.cars = Some(self.salesperson_cars(&salesperson).await?)
                }
                SalespersonRelation::Dealer => {
                    salesperson.dealer = Some(self.salesperson_dealer(&salesperson).await?)
                }
            }
        }
        Ok(salesperson)
    }

    pub async fn expand_dealers(&self, dealers: Vec<Dealer>, include: &[DealerRelation]) -> Result<Vec<Dealer>> {
        if include.is_empty() {
            return Ok(dealers);
        }
        try_join_all(dealers.into_iter().map(|d| self.expand_dealer(d, include))).await
    }

    pub async fn expand_cars(&self, cars: Vec<Car>, include: &[CarRelation]) -> Result<Vec<Car>> {
        if include.is_empty() {
            return Ok(cars);
        }
        try_join_all(cars.into_iter().map(|c| self.expand_car(c, include))).await
    }

    pub async fn expand_salespeople(
        &self,
        people: Vec<Salesperson>,
        include: &[SalespersonRelation],
    ) -> Result<Vec<Salesperson>> {
        if include.is_empty() {
            return Ok(people);
        }
        try_join_all(people.into_iter().map(|p| self.expand_salesperson(p, include))).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn relation_names() {
        assert_eq!("cars".parse::<DealerRelation>().unwrap(), DealerRelation::Cars);
        assert_eq!("dealer".parse::<CarRelation>().unwrap(), CarRelation::Dealer);
        assert!("owner".parse::<SalespersonRelation>().is_err());
        assert!("Cars".parse::<DealerRelation>().is_err());
    }
}
