//! Connection builder: the proximity graph drawn between nearby particles.

use crate::spatial_hash::SpatialHash;
use observer_data::{Connection, Particle};

/// Enumerates edges between particles closer than `connection_distance`.
///
/// Uses a grid with cell size equal to the connection distance, so the 3x3
/// neighbourhood covers every candidate. A pair is produced once, from the
/// endpoint with the smaller id, and only if its distance lies in
/// `(0, connection_distance)`. Enumeration stops as soon as `max_edges`
/// edges exist; the edges kept are the first found in particle order.
pub fn build_connections(
    particles: &[Particle],
    connection_distance: f64,
    max_edges: usize,
    grid: &mut SpatialHash,
) -> Vec<Connection> {
    let mut links = Vec::new();
    if particles.len() < 2 || max_edges == 0 {
        return links;
    }

    let positions: Vec<(f64, f64)> = particles.iter().map(|p| (p.x, p.y)).collect();
    grid.cell_size = connection_distance;
    grid.build(&positions);

    for p in particles {
        let complete = grid.query_until(p.x, p.y, |j| {
            let other = &particles[j];
            if p.id < other.id {
                let distance = p.distance_to(other);
                if distance > 0.0 && distance < connection_distance {
                    links.push(Connection::new(p.id, other.id, distance));
                }
            }
            links.len() < max_edges
        });
        if !complete {
            tracing::debug!(max_edges, "Connection cap reached");
            break;
        }
    }

    links
}

/// Keeps only edges whose endpoints share a cluster (social rendering).
///
/// Assumes `particles[i].id == i`, as produced by the particle store.
pub fn intra_cluster<'a>(
    particles: &'a [Particle],
    connections: &'a [Connection],
) -> impl Iterator<Item = &'a Connection> + 'a {
    connections.iter().filter(move |c| {
        match (
            particles.get(c.source as usize),
            particles.get(c.target as usize),
        ) {
            (Some(a), Some(b)) => a.cluster == b.cluster,
            _ => false,
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    fn line(ids_and_x: &[(u32, f64)]) -> Vec<Particle> {
        ids_and_x
            .iter()
            .map(|&(id, x)| Particle::new(id, x, 0.0))
            .collect()
    }

    #[test]
    fn test_only_pairs_under_distance() {
        // 0-1 at 10, 0-2 at 50, 1-2 at 40; 200 away for 3.
        let ps = line(&[(0, 0.0), (1, 10.0), (2, 50.0), (3, 250.0)]);
        let edges = build_connections(&ps, 45.0, 2000, &mut SpatialHash::default());
        let pairs: HashSet<(u32, u32)> = edges.iter().map(|e| (e.source, e.target)).collect();
        assert_eq!(pairs, HashSet::from([(0, 1), (1, 2)]));
    }

    #[test]
    fn test_no_duplicates_or_self_pairs() {
        let ps: Vec<Particle> = (0..50)
            .map(|i| Particle::new(i, f64::from(i % 7) * 3.0, f64::from(i / 7) * 3.0))
            .collect();
        let edges = build_connections(&ps, 10.0, 10_000, &mut SpatialHash::default());
        let mut seen = HashSet::new();
        for e in &edges {
            assert!(e.source < e.target);
            assert!(seen.insert((e.source, e.target)));
        }
    }

    #[test]
    fn test_coincident_particles_are_not_connected() {
        let ps = line(&[(0, 5.0), (1, 5.0)]);
        assert!(build_connections(&ps, 10.0, 10, &mut SpatialHash::default()).is_empty());
    }

    #[test]
    fn test_cap_halts_enumeration() {
        let ps: Vec<Particle> = (0..40).map(|i| Particle::new(i, f64::from(i) * 0.5, 0.0)).collect();
        let edges = build_connections(&ps, 100.0, 25, &mut SpatialHash::default());
        assert_eq!(edges.len(), 25);
        // All found from particle 0 before moving on.
        assert!(edges.iter().all(|e| e.source == 0));
    }

    #[test]
    fn test_intra_cluster_filter() {
        let mut ps = line(&[(0, 0.0), (1, 5.0), (2, 10.0)]);
        ps[1].cluster = 1;
        let edges = build_connections(&ps, 20.0, 100, &mut SpatialHash::default());
        assert_eq!(edges.len(), 3);
        let same: Vec<_> = intra_cluster(&ps, &edges).collect();
        assert_eq!(same.len(), 1);
        assert_eq!((same[0].source, same[0].target), (0, 2));
    }
}
