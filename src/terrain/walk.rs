use super::constants::DETOUR_MIDPOINT_JITTER;
use super::coordinates::GridCoord;
use crate::config::range_types::Probability;
use rand::Rng;

/// Walk from `start` toward `target`, one orthogonal step at a time.
///
/// With probability `bias` each step closes the larger remaining axis distance
/// (ties go to y), otherwise it closes a random axis that still has distance left.
/// The walk gives up after `width + height` steps. The returned path holds the
/// start and every visited cell.
pub fn biased_walk<R: Rng + ?Sized>(
    start: GridCoord,
    target: GridCoord,
    bias: Probability,
    width: u32,
    height: u32,
    rng: &mut R,
) -> Vec<GridCoord> {
    let mut path = vec![start];
    let mut current = start;
    let max_steps = width as usize + height as usize;

    for _ in 0..max_steps {
        if current == target {
            break;
        }

        let dx = target.x as i64 - current.x as i64;
        let dy = target.y as i64 - current.y as i64;

        let step_x = if bias.roll(rng) {
            dx.abs() > dy.abs()
        } else {
            match (dx != 0, dy != 0) {
                (true, true) => rng.r#gen::<bool>(),
                (true, false) => true,
                _ => false,
            }
        };

        let (nx, ny) = if step_x {
            (current.x as i64 + dx.signum(), current.y as i64)
        } else {
            (current.x as i64, current.y as i64 + dy.signum())
        };

        current = GridCoord::clamped(nx, ny, width, height);
        path.push(current);
    }

    path
}

/// Two-leg walk bending through a jittered midpoint between `from` and `to`
pub fn detour_path<R: Rng + ?Sized>(
    from: GridCoord,
    to: GridCoord,
    outbound_bias: Probability,
    return_bias: Probability,
    width: u32,
    height: u32,
    rng: &mut R,
) -> Vec<GridCoord> {
    let mid_x = (from.x as i64 + to.x as i64) / 2
        + rng.gen_range(-DETOUR_MIDPOINT_JITTER..=DETOUR_MIDPOINT_JITTER);
    let mid_y = (from.y as i64 + to.y as i64) / 2
        + rng.gen_range(-DETOUR_MIDPOINT_JITTER..=DETOUR_MIDPOINT_JITTER);
    let midpoint = GridCoord::clamped(mid_x, mid_y, width, height);

    let mut path = biased_walk(from, midpoint, outbound_bias, width, height, rng);
    let tail = biased_walk(midpoint, to, return_bias, width, height, rng);
    // The midpoint already ends the outbound leg
    path.extend(tail.into_iter().skip(1));
    path
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_pcg::Pcg64;

    fn is_connected(path: &[GridCoord]) -> bool {
        path.windows(2).all(|w| w[0].manhattan(&w[1]) == 1)
    }

    #[test]
    fn test_walk_reaches_target() {
        let mut rng = Pcg64::seed_from_u64(17);
        for _ in 0..20 {
            let start = GridCoord::new(rng.gen_range(0..30), rng.gen_range(0..30));
            let target = GridCoord::new(rng.gen_range(0..30), rng.gen_range(0..30));
            let path = biased_walk(start, target, Probability::new(0.8), 30, 30, &mut rng);

            assert_eq!(path[0], start);
            assert_eq!(*path.last().unwrap(), target);
            assert!(is_connected(&path));
            // Every step closes the distance, so the walk is a shortest path
            assert_eq!(path.len() as u32, start.manhattan(&target) + 1);
        }
    }

    #[test]
    fn test_full_bias_follows_larger_axis() {
        let mut rng = Pcg64::seed_from_u64(2);
        let path = biased_walk(
            GridCoord::new(0, 0),
            GridCoord::new(4, 1),
            Probability::new(1.0),
            10,
            10,
            &mut rng,
        );
        let expected: Vec<GridCoord> = [(0, 0), (1, 0), (2, 0), (3, 0), (3, 1), (4, 1)]
            .into_iter()
            .map(|(x, y)| GridCoord::new(x, y))
            .collect();
        assert_eq!(path, expected);
    }

    #[test]
    fn test_walk_to_self_is_single_cell() {
        let mut rng = Pcg64::seed_from_u64(0);
        let here = GridCoord::new(3, 3);
        assert_eq!(
            biased_walk(here, here, Probability::new(0.8), 5, 5, &mut rng),
            vec![here]
        );
    }

    #[test]
    fn test_detour_ends_at_target_in_bounds() {
        let mut rng = Pcg64::seed_from_u64(33);
        for _ in 0..20 {
            let from = GridCoord::new(rng.gen_range(0..20), rng.gen_range(0..20));
            let to = GridCoord::new(rng.gen_range(0..20), rng.gen_range(0..20));
            let path = detour_path(
                from,
                to,
                Probability::new(0.6),
                Probability::new(0.7),
                20,
                20,
                &mut rng,
            );
            assert_eq!(path[0], from);
            assert_eq!(*path.last().unwrap(), to);
            assert!(is_connected(&path));
            assert!(path.iter().all(|c| c.x < 20 && c.y < 20));
        }
    }
}
