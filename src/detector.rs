//! Incremental change detection over the notification store.
//!
//! The detector keeps a cursor (id + effective timestamp of the newest record
//! it has already seen) and walks the store newest-first on each poll,
//! stopping at the cursor. Matching on the id alone is not enough: dismissed
//! notifications vanish from the store at any time, so the record the cursor
//! points at may no longer exist. The timestamp gives a second stop condition
//! that survives deletions.

use tracing::{debug, warn};

use crate::Result;
use crate::store::{NotificationStore, StoreRecord};

/// Rows fetched per window query while walking backwards.
const WINDOW_SIZE: u32 = 5;

/// The newest record the poller has fully processed.
///
/// Both fields advance together; a cursor never refers to half of one poll.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Cursor {
    /// `rec_id` of the newest processed record.
    pub last_seen_id: i64,
    /// Effective timestamp of that record, seconds in the store epoch.
    pub last_seen_date: f64,
}

impl Cursor {
    /// Cursor pointing at `record`.
    pub fn at(record: &StoreRecord) -> Self {
        Self {
            last_seen_id: record.rec_id,
            last_seen_date: record.effective_timestamp(),
        }
    }

    /// Whether `candidate` refers to a strictly newer record than `self`.
    fn is_older_than(&self, candidate: &Cursor) -> bool {
        candidate.last_seen_date > self.last_seen_date
            || (candidate.last_seen_date == self.last_seen_date
                && candidate.last_seen_id > self.last_seen_id)
    }
}

/// Result of one poll: the new records plus the cursor to commit once they
/// have all been processed.
#[derive(Debug)]
pub struct PollOutcome {
    /// Genuinely-new records, oldest first (dispatch order).
    pub records: Vec<StoreRecord>,
    /// The newest record observed during this poll. Commit it via
    /// [`ChangeDetector::commit`] only after every record in `records` has
    /// been dispatched.
    pub prospective: Option<Cursor>,
}

impl PollOutcome {
    fn empty() -> Self {
        Self {
            records: Vec::new(),
            prospective: None,
        }
    }
}

/// Detects records that appeared in the store since the previous poll.
#[derive(Debug, Default)]
pub struct ChangeDetector {
    cursor: Option<Cursor>,
}

impl ChangeDetector {
    pub fn new() -> Self {
        Self { cursor: None }
    }

    /// The current cursor, if a baseline has been captured.
    pub fn cursor(&self) -> Option<&Cursor> {
        self.cursor.as_ref()
    }

    /// Capture the startup baseline from the current newest record.
    ///
    /// Everything already in the store at this point is considered seen, so
    /// historical notifications are never re-sent. An empty store leaves the
    /// cursor unset; the first poll that observes a record establishes it.
    pub async fn capture_baseline(&mut self, store: &NotificationStore) -> Result<()> {
        match store.newest().await? {
            Some(record) => {
                let cursor = Cursor::at(&record);
                debug!(
                    rec_id = cursor.last_seen_id,
                    "Baseline captured from newest record"
                );
                self.cursor = Some(cursor);
            }
            None => {
                debug!("Store is empty at startup; no baseline to capture");
                self.cursor = None;
            }
        }
        Ok(())
    }

    /// Walk the store newest-first and collect every record newer than the
    /// cursor, returned oldest-first.
    ///
    /// The walk stops when it reaches the cursor's id, when it passes the
    /// cursor's timestamp (the cursor record itself may have been dismissed
    /// and deleted), or when the store runs out of rows. The walk is bounded
    /// by the store's live row count, so an emptied store terminates
    /// immediately with zero records.
    pub async fn poll(&self, store: &NotificationStore) -> Result<PollOutcome> {
        let mut collected: Vec<StoreRecord> = Vec::new();
        let mut prospective: Option<Cursor> = None;
        let mut offset: u32 = 0;

        'walk: loop {
            let page = store.fetch_window(offset, WINDOW_SIZE).await?;
            if page.is_empty() {
                break;
            }
            let page_len = page.len() as u32;

            for record in page {
                if prospective.is_none() {
                    prospective = Some(Cursor::at(&record));
                }

                if let Some(cursor) = &self.cursor {
                    if record.rec_id == cursor.last_seen_id {
                        break 'walk;
                    }
                    if record.effective_timestamp() < cursor.last_seen_date {
                        debug!(
                            rec_id = record.rec_id,
                            "Walked past last-seen timestamp; cursor record was deleted"
                        );
                        break 'walk;
                    }
                }

                collected.push(record);
            }

            if page_len < WINDOW_SIZE {
                break;
            }
            offset += page_len;
        }

        if self.cursor.is_none() && !collected.is_empty() {
            warn!(
                count = collected.len(),
                "No baseline cursor; treating every live record as new"
            );
        }

        if collected.is_empty() && prospective.is_none() {
            return Ok(PollOutcome::empty());
        }

        // Collected newest-first; dispatch wants chronological order.
        collected.reverse();

        Ok(PollOutcome {
            records: collected,
            prospective,
        })
    }

    /// Commit the prospective cursor from a completed poll.
    ///
    /// Advance-only: a candidate older than the current cursor (the newest
    /// surviving record after a burst of dismissals) is ignored, otherwise the
    /// next poll would re-deliver everything between the two.
    pub fn commit(&mut self, candidate: Cursor) {
        let newer = match &self.cursor {
            None => true,
            Some(current) => current.is_older_than(&candidate),
        };
        if newer {
            self.cursor = Some(candidate);
        }
    }
}
