//! Midpoint-distance identity assignment and zone bookkeeping

use crate::bbox::{Bbox, Point};
use crate::error::{Result, TrackError};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, VecDeque};

/// Progress of an object through the entry/exit reference lines
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ZoneState {
    #[default]
    NotEntered,
    InTransit,
    Exited,
}

/// Which reference line a timestamp belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Crossing {
    Entry,
    Exit,
}

impl Crossing {
    pub fn from_is_entry(is_entry: bool) -> Self {
        if is_entry {
            Crossing::Entry
        } else {
            Crossing::Exit
        }
    }

    fn slot(self) -> usize {
        match self {
            Crossing::Entry => 0,
            Crossing::Exit => 1,
        }
    }
}

/// Vertical position observed at a given tracker frame
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PositionSample {
    pub y: f32,
    pub frame: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrackerConfig {
    /// Maximum midpoint distance (pixels) for a detection to match an object.
    /// Matching is strict: a distance equal to the offset does not match.
    pub distance_offset: f32,
    /// Capacity of each object's position history
    pub sample_window: usize,
    /// Archive objects not matched for more than this many frames.
    /// `None` keeps every object live for the whole session.
    pub max_unseen_frames: Option<u64>,
}

impl Default for TrackerConfig {
    fn default() -> Self {
        Self {
            distance_offset: 90.0,
            sample_window: 3,
            max_unseen_frames: None,
        }
    }
}

impl TrackerConfig {
    pub fn validate(&self) -> Result<()> {
        if !self.distance_offset.is_finite() || self.distance_offset <= 0.0 {
            return Err(TrackError::config(format!(
                "distance_offset must be a positive number, got {}",
                self.distance_offset
            )));
        }
        if self.sample_window == 0 {
            return Err(TrackError::config("sample_window must be at least 1"));
        }
        Ok(())
    }
}

#[derive(Debug, Clone)]
pub struct TrackedObject {
    /// track id
    pub id: u32,
    /// midpoint of the most recent matched box
    pub anchor: Point,
    pub zone_state: ZoneState,
    /// [entry, exit] clock readings in seconds
    pub timestamps: [Option<f64>; 2],
    /// most recent vertical positions, oldest first
    pub position_history: VecDeque<PositionSample>,
    /// number of detections matched to this object, including the first
    pub hits: u32,
    pub last_seen_frame: u64,
}

impl TrackedObject {
    fn new(id: u32, anchor: Point, window: usize, frame: u64) -> Self {
        TrackedObject {
            id,
            anchor,
            zone_state: ZoneState::NotEntered,
            timestamps: [None, None],
            position_history: VecDeque::with_capacity(window),
            hits: 1,
            last_seen_frame: frame,
        }
    }
}

/// Owns every tracked object and hands out stable ids.
///
/// Identity assignment is first-match: objects are scanned in ascending id
/// order and the first anchor closer than `distance_offset` wins, even if a
/// later object is closer.
#[derive(Debug, Clone)]
pub struct Tracker {
    config: TrackerConfig,
    objects: BTreeMap<u32, TrackedObject>,
    archived: BTreeMap<u32, TrackedObject>,
    in_transit: Vec<u32>,
    completed: Vec<u32>,
    frame: u64,
}

impl Default for Tracker {
    fn default() -> Self {
        Self::with_config(TrackerConfig::default())
    }
}

impl Tracker {
    pub fn new(config: TrackerConfig) -> Result<Self> {
        config.validate()?;
        log::info!(
            "Creating Tracker with config: distance_offset={:.1}, sample_window={}, max_unseen_frames={:?}",
            config.distance_offset,
            config.sample_window,
            config.max_unseen_frames
        );
        Ok(Self::with_config(config))
    }

    fn with_config(config: TrackerConfig) -> Self {
        Tracker {
            config,
            objects: BTreeMap::new(),
            archived: BTreeMap::new(),
            in_transit: Vec::new(),
            completed: Vec::new(),
            frame: 0,
        }
    }

    pub fn config(&self) -> &TrackerConfig {
        &self.config
    }

    /// Map a detection's corners to an object id
    pub fn assign_identity(&mut self, top_left: Point, bottom_right: Point) -> Result<u32> {
        let bbox = Bbox::from_corners(top_left, bottom_right)?;
        Ok(self.assign_midpoint(bbox.center()))
    }

    /// Same as [`Tracker::assign_identity`] for an already validated box
    pub fn assign_bbox(&mut self, bbox: &Bbox) -> u32 {
        self.assign_midpoint(bbox.center())
    }

    fn assign_midpoint(&mut self, midpoint: Point) -> u32 {
        let offset = self.config.distance_offset;
        let frame = self.frame;

        if let Some(object) = self
            .objects
            .values_mut()
            .find(|obj| midpoint.distance(&obj.anchor) < offset)
        {
            object.anchor = midpoint;
            object.hits += 1;
            object.last_seen_frame = frame;
            return object.id;
        }

        let id = self.known_count() as u32 + 1;
        log::debug!("New object {} at {}", id, midpoint);
        self.objects.insert(
            id,
            TrackedObject::new(id, midpoint, self.config.sample_window, frame),
        );
        id
    }

    /// Move an object from NotEntered to InTransit.
    ///
    /// Returns `false` if the object was already in transit or has exited.
    pub fn mark_entering_zone(&mut self, id: u32) -> Result<bool> {
        let object = self.object_mut(id)?;
        if object.zone_state != ZoneState::NotEntered {
            return Ok(false);
        }
        object.zone_state = ZoneState::InTransit;
        self.in_transit.push(id);
        log::debug!("Object {} entered the measurement zone", id);
        Ok(true)
    }

    /// Move an object from InTransit to Exited and record it as completed.
    ///
    /// Returns `false` if the object never entered or already exited.
    pub fn mark_exited_zone(&mut self, id: u32) -> Result<bool> {
        let object = self.object_mut(id)?;
        if object.zone_state != ZoneState::InTransit {
            return Ok(false);
        }
        object.zone_state = ZoneState::Exited;
        self.in_transit.retain(|&transit_id| transit_id != id);
        if self.completed.last() != Some(&id) {
            self.completed.push(id);
        }
        log::debug!("Object {} left the measurement zone", id);
        Ok(true)
    }

    /// Store a crossing time in the object's entry or exit slot
    pub fn set_timestamp(&mut self, id: u32, crossing: Crossing, time: f64) -> Result<()> {
        self.object_mut(id)?.timestamps[crossing.slot()] = Some(time);
        Ok(())
    }

    /// Append a vertical position, evicting the oldest sample when full
    pub fn push_sample(&mut self, id: u32, y: f32) -> Result<()> {
        let window = self.config.sample_window;
        let frame = self.frame;
        let history = &mut self.object_mut(id)?.position_history;
        if history.len() == window {
            history.pop_front();
        }
        history.push_back(PositionSample { y, frame });
        Ok(())
    }

    /// Advance the frame counter and archive stale objects if configured
    pub fn begin_frame(&mut self) {
        self.frame += 1;

        let Some(max_unseen) = self.config.max_unseen_frames else {
            return;
        };
        let frame = self.frame;
        let stale: Vec<u32> = self
            .objects
            .values()
            .filter(|obj| frame - obj.last_seen_frame > max_unseen)
            .map(|obj| obj.id)
            .collect();

        for id in stale {
            if let Some(object) = self.objects.remove(&id) {
                log::debug!(
                    "Archiving object {} unseen since frame {}",
                    id,
                    object.last_seen_frame
                );
                self.in_transit.retain(|&transit_id| transit_id != id);
                self.archived.insert(id, object);
            }
        }
    }

    /// Drop all objects and counters
    pub fn reset(&mut self) {
        self.objects.clear();
        self.archived.clear();
        self.in_transit.clear();
        self.completed.clear();
        self.frame = 0;
    }

    pub fn get(&self, id: u32) -> Option<&TrackedObject> {
        self.objects.get(&id)
    }

    /// Archived objects are kept for bookkeeping only
    pub fn get_archived(&self, id: u32) -> Option<&TrackedObject> {
        self.archived.get(&id)
    }

    fn object_mut(&mut self, id: u32) -> Result<&mut TrackedObject> {
        self.objects
            .get_mut(&id)
            .ok_or(TrackError::UnknownObject(id))
    }

    /// Live objects in ascending id order
    pub fn objects(&self) -> impl Iterator<Item = &TrackedObject> {
        self.objects.values()
    }

    /// Number of live objects
    pub fn len(&self) -> usize {
        self.objects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    /// Live plus archived objects; the next id is this plus one
    pub fn known_count(&self) -> usize {
        self.objects.len() + self.archived.len()
    }

    pub fn in_transit(&self) -> &[u32] {
        &self.in_transit
    }

    pub fn completed(&self) -> &[u32] {
        &self.completed
    }

    pub fn in_transit_count(&self) -> usize {
        self.in_transit.len()
    }

    pub fn completed_count(&self) -> usize {
        self.completed.len()
    }

    pub fn frame(&self) -> u64 {
        self.frame
    }
}
