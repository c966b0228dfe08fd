use glam::DVec2;
use tracing::{debug, warn};

use super::spatial::SpatialGrid;
use super::{ClusterIndex, ClusterOptions, ClusterProperties, Feature};
use crate::error::ClusterError;
use crate::geo::{from_mercator, lat_y, lng_x, to_mercator, wrap_lng};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Member {
    /// Index into the loaded points
    Leaf(usize),
    /// Index into the cluster table (also the public cluster id)
    Cluster(usize),
}

#[derive(Clone, Copy, Debug)]
struct Item {
    weight: usize,
    member: Member,
}

struct ClusterNode {
    /// Weighted centroid in Mercator space
    position: DVec2,
    point_count: usize,
    /// Zoom level the cluster first appears at
    zoom: u8,
    /// Members it absorbed from the level below (zoom + 1)
    children: Vec<Member>,
}

/// Deepest zoom the index builds levels for. Past it the search radius is far below
/// any distinguishable distance and every level would equal the one above.
pub const MAX_INDEX_ZOOM: u8 = 30;

/// Greedy hierarchical clustering over per-zoom spatial grids.
///
/// Level `max_zoom + 1` holds every point; each level above merges items that fall
/// within `radius / (extent * 2^z)` of an unprocessed seed item.
pub struct GridCluster<P> {
    options: ClusterOptions,
    points: Vec<Feature<P>>,
    clusters: Vec<ClusterNode>,
    /// `levels[z - min_zoom]` for z in `min_zoom..=max_zoom + 1`
    levels: Vec<SpatialGrid<Item>>,
}

impl<P> GridCluster<P> {
    pub fn options(&self) -> &ClusterOptions {
        &self.options
    }

    /// Number of loaded points
    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    fn top_zoom(&self) -> u8 {
        self.options.max_zoom + 1
    }

    fn level(&self, zoom: i32) -> Option<&SpatialGrid<Item>> {
        let z = zoom.clamp(self.options.min_zoom as i32, self.top_zoom() as i32);
        self.levels.get((z - self.options.min_zoom as i32) as usize)
    }

    fn node(&self, cluster_id: usize) -> Result<&ClusterNode, ClusterError> {
        self.clusters
            .get(cluster_id)
            .ok_or(ClusterError::UnknownCluster { cluster_id })
    }

    /// Merge `prev` (level z + 1) into level z
    fn cluster_level(&mut self, prev: &SpatialGrid<Item>, z: u8) -> SpatialGrid<Item> {
        let r = self.options.radius_at(z);
        let mut next = SpatialGrid::new(r);
        let mut processed = vec![false; prev.len()];
        let items = prev.items();

        for i in 0..prev.len() {
            if processed[i] {
                continue;
            }
            processed[i] = true;

            let pos = prev.position(i);
            let seed = items[i];
            let neighbors: Vec<usize> = prev
                .within(pos, r)
                .into_iter()
                .filter(|&j| !processed[j])
                .collect();
            let weight = seed.weight + neighbors.iter().map(|&j| items[j].weight).sum::<usize>();

            if weight > seed.weight && weight >= self.options.min_points {
                let mut centroid = pos * seed.weight as f64;
                let mut children = vec![seed.member];
                for &j in &neighbors {
                    processed[j] = true;
                    centroid += prev.position(j) * items[j].weight as f64;
                    children.push(items[j].member);
                }
                centroid /= weight as f64;

                let id = self.clusters.len();
                self.clusters.push(ClusterNode {
                    position: centroid,
                    point_count: weight,
                    zoom: z,
                    children,
                });
                next.insert(
                    centroid,
                    Item {
                        weight,
                        member: Member::Cluster(id),
                    },
                );
            } else {
                // Too few to cluster: seed and its neighbours pass through unchanged
                next.insert(pos, seed);
                for &j in &neighbors {
                    processed[j] = true;
                    next.insert(prev.position(j), items[j]);
                }
            }
        }

        next
    }

    fn cluster_feature(&self, cluster_id: usize) -> Feature<P> {
        let node = &self.clusters[cluster_id];
        Feature::cluster(
            from_mercator(node.position),
            ClusterProperties::new(cluster_id, node.point_count),
        )
    }
}

impl<P: Clone> GridCluster<P> {
    fn feature(&self, member: Member) -> Feature<P> {
        match member {
            Member::Leaf(i) => self.points[i].clone(),
            Member::Cluster(c) => self.cluster_feature(c),
        }
    }
}

impl<P: Clone> ClusterIndex<P> for GridCluster<P> {
    fn new(mut options: ClusterOptions) -> Self {
        options.max_zoom = options.max_zoom.min(MAX_INDEX_ZOOM);
        options.min_zoom = options.min_zoom.min(options.max_zoom);
        Self {
            options,
            points: Vec::new(),
            clusters: Vec::new(),
            levels: Vec::new(),
        }
    }

    fn load(&mut self, points: Vec<Feature<P>>) {
        self.points = points;
        self.clusters.clear();

        let mut top = SpatialGrid::new(self.options.radius_at(self.top_zoom()));
        for (i, point) in self.points.iter().enumerate() {
            let pos = to_mercator(point.geometry);
            if !pos.is_finite() {
                warn!(index = i, geometry = ?point.geometry, "point without a finite position left out of the index");
                continue;
            }
            top.insert(
                pos,
                Item {
                    weight: 1,
                    member: Member::Leaf(i),
                },
            );
        }

        let mut levels = vec![top];
        for z in (self.options.min_zoom..=self.options.max_zoom).rev() {
            let next = match levels.last() {
                Some(prev) => self.cluster_level(prev, z),
                None => break,
            };
            levels.push(next);
        }
        levels.reverse();
        self.levels = levels;

        debug!(
            points = self.points.len(),
            clusters = self.clusters.len(),
            max_zoom = self.options.max_zoom,
            radius = self.options.radius,
            "cluster index loaded"
        );
    }

    fn get_clusters(&self, bbox: [f64; 4], zoom: i32) -> Vec<Feature<P>> {
        let mut min_lng = wrap_lng(bbox[0]);
        let min_lat = bbox[1].clamp(-90.0, 90.0);
        let mut max_lng = if bbox[2] == 180.0 { 180.0 } else { wrap_lng(bbox[2]) };
        let max_lat = bbox[3].clamp(-90.0, 90.0);

        if bbox[2] - bbox[0] >= 360.0 {
            min_lng = -180.0;
            max_lng = 180.0;
        } else if min_lng > max_lng {
            // Box crosses the antimeridian
            let mut east = self.get_clusters([min_lng, min_lat, 180.0, max_lat], zoom);
            east.extend(self.get_clusters([-180.0, min_lat, max_lng, max_lat], zoom));
            return east;
        }

        let Some(level) = self.level(zoom) else {
            return Vec::new();
        };
        let min = DVec2::new(lng_x(min_lng), lat_y(max_lat));
        let max = DVec2::new(lng_x(max_lng), lat_y(min_lat));

        level
            .query_bbox(min, max)
            .into_iter()
            .map(|i| self.feature(level.items()[i].member))
            .collect()
    }

    fn get_children(&self, cluster_id: usize) -> Result<Vec<Feature<P>>, ClusterError> {
        let node = self.node(cluster_id)?;
        Ok(node.children.iter().map(|&m| self.feature(m)).collect())
    }

    fn get_leaves(
        &self,
        cluster_id: usize,
        limit: usize,
        offset: usize,
    ) -> Result<Vec<Feature<P>>, ClusterError> {
        let node = self.node(cluster_id)?;
        let mut leaves = Vec::new();
        let mut skipped = 0;
        let mut stack: Vec<Member> = node.children.iter().rev().copied().collect();

        while let Some(member) = stack.pop() {
            if leaves.len() >= limit {
                break;
            }
            match member {
                Member::Cluster(c) => {
                    let child = &self.clusters[c];
                    if skipped + child.point_count <= offset {
                        // Whole subtree falls inside the offset
                        skipped += child.point_count;
                        continue;
                    }
                    stack.extend(child.children.iter().rev().copied());
                }
                Member::Leaf(i) => {
                    if skipped < offset {
                        skipped += 1;
                    } else {
                        leaves.push(self.points[i].clone());
                    }
                }
            }
        }

        Ok(leaves)
    }

    fn get_cluster_expansion_zoom(&self, cluster_id: usize) -> Result<u8, ClusterError> {
        let mut node = self.node(cluster_id)?;
        let mut zoom = node.zoom;

        while zoom <= self.options.max_zoom {
            zoom += 1;
            match node.children.as_slice() {
                [Member::Cluster(only)] => node = &self.clusters[*only],
                _ => break,
            }
        }

        Ok(zoom)
    }
}
