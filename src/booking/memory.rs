use std::collections::HashMap;
use std::sync::Mutex;

use chrono::NaiveDate;

use super::availability;
use super::domain::{BookingId, PaymentReference, SlipId, SlipSnapshot};
use super::lifecycle::BookingRecord;
use super::repository::{BookingRepository, PaymentConfirmation, RepositoryError};

/// Mutex-guarded reference implementation of [`BookingRepository`].
///
/// Every confirm operation runs its availability re-check and status flip
/// inside the same lock acquisition, which is this store's equivalent of a
/// SQL exclusion constraint: two overlapping confirmations serialized through
/// the mutex can never both succeed.
#[derive(Default)]
pub struct InMemoryBookingStore {
    inner: Mutex<StoreInner>,
}

#[derive(Default)]
struct StoreInner {
    slips: HashMap<SlipId, SlipSnapshot>,
    bookings: HashMap<BookingId, BookingRecord>,
}

impl InMemoryBookingStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_slips(slips: impl IntoIterator<Item = SlipSnapshot>) -> Self {
        let store = Self::new();
        {
            let mut inner = store.inner.lock().expect("store mutex poisoned");
            for slip in slips {
                inner.slips.insert(slip.id.clone(), slip);
            }
        }
        store
    }

    pub fn add_slip(&self, slip: SlipSnapshot) {
        let mut inner = self.inner.lock().expect("store mutex poisoned");
        inner.slips.insert(slip.id.clone(), slip);
    }
}

impl StoreInner {
    fn range_is_free(&self, candidate: &BookingRecord) -> bool {
        let others = self
            .bookings
            .values()
            .filter(|existing| existing.id != candidate.id);
        availability::is_available(others, &candidate.slip_id, &candidate.stay)
    }
}

impl BookingRepository for InMemoryBookingStore {
    fn slip(&self, id: &SlipId) -> Result<Option<SlipSnapshot>, RepositoryError> {
        let inner = self.inner.lock().expect("store mutex poisoned");
        Ok(inner.slips.get(id).cloned())
    }

    fn insert(&self, record: BookingRecord) -> Result<BookingRecord, RepositoryError> {
        let mut inner = self.inner.lock().expect("store mutex poisoned");
        if inner.bookings.contains_key(&record.id) {
            return Err(RepositoryError::Conflict);
        }
        inner.bookings.insert(record.id.clone(), record.clone());
        Ok(record)
    }

    fn insert_confirmed_if_available(
        &self,
        record: BookingRecord,
    ) -> Result<BookingRecord, RepositoryError> {
        let mut inner = self.inner.lock().expect("store mutex poisoned");
        if inner.bookings.contains_key(&record.id) {
            return Err(RepositoryError::Conflict);
        }
        if !inner.range_is_free(&record) {
            return Err(RepositoryError::Conflict);
        }
        inner.bookings.insert(record.id.clone(), record.clone());
        Ok(record)
    }

    fn fetch(&self, id: &BookingId) -> Result<Option<BookingRecord>, RepositoryError> {
        let inner = self.inner.lock().expect("store mutex poisoned");
        Ok(inner.bookings.get(id).cloned())
    }

    fn find_by_reference(
        &self,
        reference: &PaymentReference,
    ) -> Result<Option<BookingRecord>, RepositoryError> {
        let inner = self.inner.lock().expect("store mutex poisoned");
        Ok(inner
            .bookings
            .values()
            .find(|booking| booking.payment_reference.as_ref() == Some(reference))
            .cloned())
    }

    fn confirmed_for_slip(&self, slip_id: &SlipId) -> Result<Vec<BookingRecord>, RepositoryError> {
        let inner = self.inner.lock().expect("store mutex poisoned");
        Ok(inner
            .bookings
            .values()
            .filter(|booking| {
                booking.slip_id == *slip_id
                    && booking.status == super::domain::BookingStatus::Confirmed
            })
            .cloned()
            .collect())
    }

    fn confirm_paid(
        &self,
        reference: &PaymentReference,
        payment_date: NaiveDate,
    ) -> Result<PaymentConfirmation, RepositoryError> {
        let mut inner = self.inner.lock().expect("store mutex poisoned");

        let id = inner
            .bookings
            .values()
            .find(|booking| booking.payment_reference.as_ref() == Some(reference))
            .map(|booking| booking.id.clone())
            .ok_or(RepositoryError::NotFound)?;

        let current = inner.bookings.get(&id).cloned().expect("row exists");

        use super::domain::{BookingStatus, PaymentStatus};
        if current.status == BookingStatus::Confirmed
            && current.payment_status == PaymentStatus::Paid
        {
            return Ok(PaymentConfirmation {
                record: current,
                already_settled: true,
            });
        }

        if !inner.range_is_free(&current) {
            return Err(RepositoryError::Conflict);
        }

        let mut updated = current;
        updated
            .mark_paid(payment_date)
            .map_err(|_| RepositoryError::IllegalState)?;
        updated.version += 1;
        inner.bookings.insert(id, updated.clone());

        Ok(PaymentConfirmation {
            record: updated,
            already_settled: false,
        })
    }

    fn approve(
        &self,
        id: &BookingId,
        expected_version: u64,
    ) -> Result<BookingRecord, RepositoryError> {
        let mut inner = self.inner.lock().expect("store mutex poisoned");

        let current = inner
            .bookings
            .get(id)
            .cloned()
            .ok_or(RepositoryError::NotFound)?;
        if current.version != expected_version {
            return Err(RepositoryError::VersionConflict);
        }
        if !inner.range_is_free(&current) {
            return Err(RepositoryError::Conflict);
        }

        let mut updated = current;
        updated
            .approve()
            .map_err(|_| RepositoryError::IllegalState)?;
        updated.version += 1;
        inner.bookings.insert(id.clone(), updated.clone());
        Ok(updated)
    }

    fn update(
        &self,
        record: BookingRecord,
        expected_version: u64,
    ) -> Result<BookingRecord, RepositoryError> {
        let mut inner = self.inner.lock().expect("store mutex poisoned");

        let current = inner
            .bookings
            .get(&record.id)
            .ok_or(RepositoryError::NotFound)?;
        if current.version != expected_version {
            return Err(RepositoryError::VersionConflict);
        }

        let mut updated = record;
        updated.version = expected_version + 1;
        inner.bookings.insert(updated.id.clone(), updated.clone());
        Ok(updated)
    }
}
