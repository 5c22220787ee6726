use uuid::Uuid;

use crate::script::LngLat;

/// One user-selected stop on the route.
///
/// `order` is a dense, 1-based sequence number, unique across the route and
/// renumbered whenever a waypoint is removed or reordered. Country fields are
/// absent until reverse geocoding (an external collaborator) attaches them.
#[derive(Clone, Debug, serde::Serialize, serde::Deserialize)]
pub struct Waypoint {
    pub id: Uuid,
    pub position: LngLat,
    pub order: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub country_code: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub country_name: Option<String>,
}

/// Ordered collection of waypoints. Exclusively owns its entries; callers
/// address them by id.
#[derive(Clone, Debug, Default, serde::Serialize, serde::Deserialize)]
pub struct Route {
    waypoints: Vec<Waypoint>,
}

impl Route {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a stop at `position` with the next sequence number.
    pub fn add(&mut self, position: LngLat) -> &Waypoint {
        let index = self.waypoints.len();
        self.waypoints.push(Waypoint {
            id: Uuid::new_v4(),
            position,
            order: index as u32 + 1,
            country_code: None,
            country_name: None,
        });
        &self.waypoints[index]
    }

    /// Remove the waypoint with `id`, renumbering the remainder. Returns
    /// whether anything was removed.
    pub fn remove(&mut self, id: Uuid) -> bool {
        let before = self.waypoints.len();
        self.waypoints.retain(|w| w.id != id);
        let removed = self.waypoints.len() != before;
        if removed {
            self.renumber();
        }
        removed
    }

    /// Move the waypoint at index `from` to index `to`, preserving the
    /// relative order of all other waypoints. Out-of-range indices are a
    /// no-op.
    pub fn move_waypoint(&mut self, from: usize, to: usize) {
        if from >= self.waypoints.len() || to >= self.waypoints.len() || from == to {
            return;
        }
        let waypoint = self.waypoints.remove(from);
        self.waypoints.insert(to, waypoint);
        self.renumber();
    }

    pub fn update_position(&mut self, id: Uuid, position: LngLat) -> bool {
        match self.waypoints.iter_mut().find(|w| w.id == id) {
            Some(w) => {
                w.position = position;
                true
            }
            None => false,
        }
    }

    /// Attach a resolved country to a waypoint. The lookup itself is owned by
    /// an external geocoding collaborator.
    pub fn set_country(
        &mut self,
        id: Uuid,
        country_code: impl Into<String>,
        country_name: impl Into<String>,
    ) -> bool {
        match self.waypoints.iter_mut().find(|w| w.id == id) {
            Some(w) => {
                w.country_code = Some(country_code.into());
                w.country_name = Some(country_name.into());
                true
            }
            None => false,
        }
    }

    pub fn clear(&mut self) {
        self.waypoints.clear();
    }

    pub fn waypoints(&self) -> &[Waypoint] {
        &self.waypoints
    }

    pub fn positions(&self) -> Vec<LngLat> {
        self.waypoints.iter().map(|w| w.position).collect()
    }

    pub fn len(&self) -> usize {
        self.waypoints.len()
    }

    pub fn is_empty(&self) -> bool {
        self.waypoints.is_empty()
    }

    fn renumber(&mut self) {
        for (i, w) in self.waypoints.iter_mut().enumerate() {
            w.order = i as u32 + 1;
        }
    }
}
