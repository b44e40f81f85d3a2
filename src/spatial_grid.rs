/*
 * Spatial Grid Module
 *
 * This module defines the SpatialHashGrid used for broad-phase neighbor
 * lookups. The world bounds are divided into a uniform grid of cells and each
 * registered client is bucketed into every cell its AABB overlaps, so a query
 * only has to look at the buckets under the query box.
 *
 * Clients live in a generational arena and callers hold a ClientId key:
 * - A removed key never resolves again, even if its slot is reused
 * - Buckets store keys, never references, so removal mid-iteration is safe
 * - Coordinates outside the bounds are clamped onto the border cells
 */

use glam::Vec2;
use slotmap::{new_key_type, SlotMap};

use crate::math::Aabb;

new_key_type! {
    // Handle to a client registered in a SpatialHashGrid
    pub struct ClientId;
}

// Inclusive rectangle of cell coordinates
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CellRange {
    pub min_x: usize,
    pub min_y: usize,
    pub max_x: usize,
    pub max_y: usize,
}

impl CellRange {
    #[inline]
    pub fn contains(&self, x: usize, y: usize) -> bool {
        x >= self.min_x && x <= self.max_x && y >= self.min_y && y <= self.max_y
    }

    // Number of cells covered by the range, zero for an inverted range
    pub fn cell_count(&self) -> usize {
        if self.max_x < self.min_x || self.max_y < self.min_y {
            return 0;
        }
        (self.max_x - self.min_x + 1) * (self.max_y - self.min_y + 1)
    }

    // Iterate (x, y) cell coordinates row by row
    pub fn cells(&self) -> impl Iterator<Item = (usize, usize)> {
        let range = *self;
        (range.min_y..=range.max_y).flat_map(move |y| (range.min_x..=range.max_x).map(move |x| (x, y)))
    }
}

// A registered occupant of the grid
#[derive(Debug, Clone, PartialEq)]
pub struct Client {
    pub entity_id: u32,
    pub aabb: Aabb,
    pub cells: CellRange,
}

pub struct SpatialHashGrid {
    bounds: Aabb,
    cell_size: Vec2,
    columns: usize,
    rows: usize,
    buckets: Vec<Vec<ClientId>>,
    clients: SlotMap<ClientId, Client>,
}

impl SpatialHashGrid {
    pub fn new(bounds: Aabb, cell_size: Vec2) -> Self {
        let bounds = Aabb::new(bounds.min, bounds.max);
        let extent = bounds.size();

        // A non-positive (or NaN) cell size degrades to a single cell on that axis
        let cell_size = Vec2::new(
            if cell_size.x > 0.0 { cell_size.x } else { extent.x.max(1.0) },
            if cell_size.y > 0.0 { cell_size.y } else { extent.y.max(1.0) },
        );

        let columns = ((extent.x / cell_size.x).ceil() as usize).max(1);
        let rows = ((extent.y / cell_size.y).ceil() as usize).max(1);

        let mut buckets = Vec::with_capacity(columns * rows);
        for _ in 0..(columns * rows) {
            buckets.push(Vec::new());
        }

        Self {
            bounds,
            cell_size,
            columns,
            rows,
            buckets,
            clients: SlotMap::with_key(),
        }
    }

    pub fn bounds(&self) -> Aabb {
        self.bounds
    }

    // (columns, rows)
    pub fn dimensions(&self) -> (usize, usize) {
        (self.columns, self.rows)
    }

    pub fn len(&self) -> usize {
        self.clients.len()
    }

    pub fn is_empty(&self) -> bool {
        self.clients.is_empty()
    }

    pub fn client(&self, id: ClientId) -> Option<&Client> {
        self.clients.get(id)
    }

    // Clients registered in a single cell, empty for coordinates off the grid
    pub fn bucket(&self, x: usize, y: usize) -> &[ClientId] {
        if x >= self.columns || y >= self.rows {
            return &[];
        }
        &self.buckets[y * self.columns + x]
    }

    // Convert a world coordinate to a clamped cell coordinate
    #[inline]
    pub fn cell_coords(&self, point: Vec2) -> (usize, usize) {
        let x = ((point.x - self.bounds.min.x) / self.cell_size.x)
            .floor()
            .clamp(0.0, (self.columns - 1) as f32) as usize;
        let y = ((point.y - self.bounds.min.y) / self.cell_size.y)
            .floor()
            .clamp(0.0, (self.rows - 1) as f32) as usize;
        (x, y)
    }

    // Boxes built field by field may have swapped corners; order them first
    #[inline]
    pub fn cell_range(&self, aabb: &Aabb) -> CellRange {
        let (min_x, min_y) = self.cell_coords(aabb.min.min(aabb.max));
        let (max_x, max_y) = self.cell_coords(aabb.min.max(aabb.max));
        CellRange {
            min_x,
            min_y,
            max_x,
            max_y,
        }
    }

    // Register an entity and return its handle
    pub fn new_client(&mut self, entity_id: u32, aabb: Aabb) -> ClientId {
        let cells = self.cell_range(&aabb);
        let id = self.clients.insert(Client {
            entity_id,
            aabb,
            cells,
        });

        for (x, y) in cells.cells() {
            self.buckets[y * self.columns + x].push(id);
        }

        id
    }

    // Store a refreshed AABB and move the client between buckets as needed.
    // Returns false for a handle that is no longer registered.
    pub fn update_client(&mut self, id: ClientId, aabb: Aabb) -> bool {
        let new_cells = self.cell_range(&aabb);
        let columns = self.columns;

        let Some(client) = self.clients.get_mut(id) else {
            return false;
        };

        client.aabb = aabb;
        let old_cells = client.cells;
        if old_cells == new_cells {
            return true;
        }
        client.cells = new_cells;

        for (x, y) in old_cells.cells() {
            if !new_cells.contains(x, y) {
                remove_from_bucket(&mut self.buckets[y * columns + x], id);
            }
        }

        for (x, y) in new_cells.cells() {
            if !old_cells.contains(x, y) {
                self.buckets[y * columns + x].push(id);
            }
        }

        true
    }

    // Deregister a client from every bucket it occupies
    pub fn remove(&mut self, id: ClientId) -> Option<Client> {
        let client = self.clients.remove(id)?;

        for (x, y) in client.cells.cells() {
            remove_from_bucket(&mut self.buckets[y * self.columns + x], id);
        }

        Some(client)
    }

    // Drop every client, keeping the bucket allocations
    pub fn clear(&mut self) {
        for bucket in &mut self.buckets {
            bucket.clear();
        }
        self.clients.clear();
    }

    // Broad-phase query returning a fresh vector
    pub fn find_near(&self, aabb: &Aabb, exclude_ids: &[u32]) -> Vec<ClientId> {
        let mut result = Vec::new();
        self.find_near_into(aabb, exclude_ids, &mut result);
        result
    }

    // Broad-phase query: every client whose cells overlap the cells under `aabb`,
    // each reported once, minus excluded entity ids. `out` is cleared first.
    pub fn find_near_into(&self, aabb: &Aabb, exclude_ids: &[u32], out: &mut Vec<ClientId>) {
        out.clear();
        let query = self.cell_range(aabb);

        for y in query.min_y..=query.max_y {
            let row = y * self.columns;

            for x in query.min_x..=query.max_x {
                for &id in &self.buckets[row + x] {
                    let Some(client) = self.clients.get(id) else {
                        continue;
                    };

                    // A client spanning several queried cells is reported only from the
                    // first cell of the overlap between its range and the query range
                    let first_x = client.cells.min_x.max(query.min_x);
                    let first_y = client.cells.min_y.max(query.min_y);
                    if x != first_x || y != first_y {
                        continue;
                    }

                    if exclude_ids.contains(&client.entity_id) {
                        continue;
                    }

                    out.push(id);
                }
            }
        }
    }

    // Broad-phase query around a circle
    pub fn find_within_radius_into(
        &self,
        center: Vec2,
        radius: f32,
        exclude_ids: &[u32],
        out: &mut Vec<ClientId>,
    ) {
        self.find_near_into(&Aabb::around_point(center, radius), exclude_ids, out);
    }
}

#[inline]
fn remove_from_bucket(bucket: &mut Vec<ClientId>, id: ClientId) {
    if let Some(index) = bucket.iter().position(|&other| other == id) {
        bucket.swap_remove(index);
    }
}
