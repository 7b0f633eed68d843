//! The Activity Store: activities held in memory and mirrored to one JSON file.
//!
//! The whole map is loaded once when the store is opened and rewritten in
//! full after every mutation. A single mutex covers lookup, mutation and the
//! file rewrite, so there is at most one writer at a time.

use crate::error::StoreError;
use activities_types::{Activity, ActivityFields, ActivityMap};
use parking_lot::Mutex;
use serde_json::Map;
use std::fs;
use std::path::{Path, PathBuf};

pub struct ActivityStore {
    path: PathBuf,
    activities: Mutex<ActivityMap>,
}

impl ActivityStore {
    /// Load the store from `path`, creating an empty document if it is missing.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let path = path.into();
        let activities = load(&path)?;
        Ok(Self {
            path,
            activities: Mutex::new(activities),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn len(&self) -> usize {
        self.activities.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.activities.lock().is_empty()
    }

    pub fn list(&self, published_only: bool) -> ActivityMap {
        let activities = self.activities.lock();
        if !published_only {
            return activities.clone();
        }
        activities
            .iter()
            .filter(|(_, a)| a.is_published())
            .map(|(name, a)| (name.clone(), a.clone()))
            .collect()
    }

    pub fn list_all(&self) -> ActivityMap {
        self.list(false)
    }

    pub fn get(&self, name: &str) -> Result<Activity, StoreError> {
        self.activities
            .lock()
            .get(name)
            .cloned()
            .ok_or(StoreError::NotFound)
    }

    /// Insert a new activity. New activities start as drafts.
    pub fn create(&self, name: &str, fields: ActivityFields) -> Result<Activity, StoreError> {
        if name.is_empty() {
            return Err(StoreError::BadRequest("Missing 'name' field".to_string()));
        }
        let created = self.mutate(|activities| {
            if activities.contains_key(name) {
                return Err(StoreError::Conflict("Activity already exists".to_string()));
            }
            let activity = Activity {
                description: fields.description.unwrap_or_default(),
                schedule: fields.schedule.unwrap_or_default(),
                max_participants: fields.max_participants.unwrap_or(0),
                participants: fields.participants.unwrap_or_default(),
                poster: fields.poster.flatten(),
                draft: fields.draft.unwrap_or(true),
                extra: Map::new(),
            };
            activities.insert(name.to_string(), activity.clone());
            Ok(activity)
        })?;
        log::info!("created activity '{}'", name);
        Ok(created)
    }

    /// Overwrite the supplied fields. `participants` is ignored here; the
    /// roster only changes through signup and unregister.
    pub fn update(&self, name: &str, fields: ActivityFields) -> Result<Activity, StoreError> {
        let updated = self.mutate(|activities| {
            let activity = activities.get_mut(name).ok_or(StoreError::NotFound)?;
            if let Some(description) = fields.description {
                activity.description = description;
            }
            if let Some(schedule) = fields.schedule {
                activity.schedule = schedule;
            }
            if let Some(max) = fields.max_participants {
                activity.max_participants = max;
            }
            if let Some(poster) = fields.poster {
                activity.poster = poster;
            }
            if let Some(draft) = fields.draft {
                activity.draft = draft;
            }
            Ok(activity.clone())
        })?;
        log::info!("updated activity '{}'", name);
        Ok(updated)
    }

    /// Remove an activity, keeping the others in creation order.
    pub fn delete(&self, name: &str) -> Result<Activity, StoreError> {
        let removed = self.mutate(|activities| {
            activities.shift_remove(name).ok_or(StoreError::NotFound)
        })?;
        log::info!("deleted activity '{}'", name);
        Ok(removed)
    }

    pub fn publish(&self, name: &str) -> Result<(), StoreError> {
        self.set_draft(name, false)?;
        log::info!("published activity '{}'", name);
        Ok(())
    }

    pub fn unpublish(&self, name: &str) -> Result<(), StoreError> {
        self.set_draft(name, true)?;
        log::info!("unpublished activity '{}'", name);
        Ok(())
    }

    pub fn signup(&self, name: &str, email: &str) -> Result<(), StoreError> {
        self.mutate(|activities| {
            let activity = activities.get_mut(name).ok_or(StoreError::NotFound)?;
            if activity.has_participant(email) {
                return Err(StoreError::Conflict("Student is already signed up".to_string()));
            }
            activity.participants.push(email.to_string());
            Ok(())
        })?;
        log::info!("signed up {} for '{}'", email, name);
        Ok(())
    }

    /// Remove the first occurrence of `email` from the roster.
    pub fn unregister(&self, name: &str, email: &str) -> Result<(), StoreError> {
        self.mutate(|activities| {
            let activity = activities.get_mut(name).ok_or(StoreError::NotFound)?;
            let pos = activity
                .participants
                .iter()
                .position(|p| p == email)
                .ok_or(StoreError::NotSignedUp)?;
            activity.participants.remove(pos);
            Ok(())
        })?;
        log::info!("unregistered {} from '{}'", email, name);
        Ok(())
    }

    fn set_draft(&self, name: &str, draft: bool) -> Result<(), StoreError> {
        self.mutate(|activities| {
            let activity = activities.get_mut(name).ok_or(StoreError::NotFound)?;
            activity.draft = draft;
            Ok(())
        })
    }

    /// Apply `f` and rewrite the file while holding the lock. If `f` fails
    /// nothing is written; if the write fails the map is restored.
    fn mutate<T, F>(&self, f: F) -> Result<T, StoreError>
    where
        F: FnOnce(&mut ActivityMap) -> Result<T, StoreError>,
    {
        let mut activities = self.activities.lock();
        let before = activities.clone();
        let out = f(&mut *activities)?;
        if let Err(e) = persist(&self.path, &*activities) {
            *activities = before;
            return Err(e);
        }
        Ok(out)
    }
}

fn load(path: &Path) -> Result<ActivityMap, StoreError> {
    if !path.exists() {
        let empty = ActivityMap::new();
        persist(path, &empty)?;
        return Ok(empty);
    }
    let raw = fs::read_to_string(path).map_err(|source| StoreError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    if raw.trim().is_empty() {
        return Ok(ActivityMap::new());
    }
    serde_json::from_str(&raw).map_err(|source| StoreError::Json {
        path: path.to_path_buf(),
        source,
    })
}

/// Write the full document to a sibling temp file, then rename it into place.
fn persist(path: &Path, activities: &ActivityMap) -> Result<(), StoreError> {
    let persist_err = |source: std::io::Error| StoreError::Persist {
        path: path.to_path_buf(),
        source,
    };

    if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
        fs::create_dir_all(dir).map_err(persist_err)?;
    }

    let mut json = serde_json::to_vec_pretty(activities)?;
    json.push(b'\n');

    let mut tmp = path.as_os_str().to_owned();
    tmp.push(".tmp");
    let tmp = PathBuf::from(tmp);

    fs::write(&tmp, json).map_err(persist_err)?;
    fs::rename(&tmp, path).map_err(persist_err)
}
