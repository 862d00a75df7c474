//! Multi-objective selection: fast non-dominated sorting with crowding
//! distance (NSGA-II) and strength/density environmental selection (SPEA2).
//!
//! All routines require a fully assessed population and minimize every
//! objective.

use rand::Rng;

use crate::Individual;

/// Partitions the population into Pareto fronts by fast non-dominated
/// sorting. Front 0 is the non-dominated set; each later front is
/// non-dominated once the earlier fronts are removed. Returns indices into
/// `population`.
#[must_use]
pub fn fast_non_dominated_sort(population: &[Individual]) -> Vec<Vec<usize>> {
    let n = population.len();
    let mut dominated_by: Vec<Vec<usize>> = vec![Vec::new(); n];
    let mut domination_count = vec![0usize; n];
    let mut fronts: Vec<Vec<usize>> = Vec::new();
    let mut current: Vec<usize> = Vec::new();

    for i in 0..n {
        for j in 0..n {
            if i == j {
                continue;
            }
            if population[i].dominates(&population[j]) {
                dominated_by[i].push(j);
            } else if population[j].dominates(&population[i]) {
                domination_count[i] += 1;
            }
        }
        if domination_count[i] == 0 {
            current.push(i);
        }
    }

    while !current.is_empty() {
        let mut next = Vec::new();
        for &i in &current {
            for &j in &dominated_by[i] {
                domination_count[j] -= 1;
                if domination_count[j] == 0 {
                    next.push(j);
                }
            }
        }
        fronts.push(std::mem::take(&mut current));
        current = next;
    }
    fronts
}

/// Crowding distance of each member of a single front.
///
/// Boundary individuals on any objective get infinite distance; interior
/// ones get the sum of normalized neighbor gaps. Degenerate objectives
/// (zero or non-finite range) contribute nothing.
#[must_use]
pub fn crowding_distance(population: &[Individual], front: &[usize]) -> Vec<f64> {
    let mut distance = vec![0.0f64; front.len()];
    if front.len() <= 2 {
        return vec![f64::INFINITY; front.len()];
    }
    let n_obj = population[front[0]].fitness().len();
    for obj in 0..n_obj {
        let mut order: Vec<usize> = (0..front.len()).collect();
        order.sort_by(|&a, &b| {
            population[front[a]].fitness()[obj].total_cmp(&population[front[b]].fitness()[obj])
        });
        let lo = population[front[order[0]]].fitness()[obj];
        let hi = population[front[*order.last().unwrap()]].fitness()[obj];
        let range = hi - lo;
        distance[order[0]] = f64::INFINITY;
        distance[*order.last().unwrap()] = f64::INFINITY;
        if range <= 0.0 || !range.is_finite() {
            continue;
        }
        for w in order.windows(3) {
            let gap = population[front[w[2]]].fitness()[obj]
                - population[front[w[0]]].fitness()[obj];
            distance[w[1]] += gap / range;
        }
    }
    distance
}

/// NSGA-II environmental selection: keep the best `k` individuals by
/// (front rank, crowding distance). Whole fronts are taken until one no
/// longer fits; that front is truncated by descending crowding distance.
#[must_use]
pub fn sel_nsga2(population: &[Individual], k: usize) -> Vec<Individual> {
    let fronts = fast_non_dominated_sort(population);
    let mut chosen: Vec<Individual> = Vec::with_capacity(k);
    for front in fronts {
        if chosen.len() + front.len() <= k {
            chosen.extend(front.iter().map(|&i| population[i].clone()));
            if chosen.len() == k {
                break;
            }
        } else {
            let distance = crowding_distance(population, &front);
            let mut order: Vec<usize> = (0..front.len()).collect();
            order.sort_by(|&a, &b| distance[b].total_cmp(&distance[a]));
            chosen.extend(
                order
                    .iter()
                    .take(k - chosen.len())
                    .map(|&i| population[front[i]].clone()),
            );
            break;
        }
    }
    chosen
}

/// Binary tournament with the crowded-comparison operator: lower front rank
/// wins, crowding distance breaks ties. Returns `k` selected clones.
#[must_use]
pub fn tournament_dcd<R>(population: &[Individual], k: usize, rng: &mut R) -> Vec<Individual>
where
    R: Rng + ?Sized,
{
    assert!(!population.is_empty());
    let fronts = fast_non_dominated_sort(population);
    let mut rank = vec![0usize; population.len()];
    let mut crowding = vec![0.0f64; population.len()];
    for (r, front) in fronts.iter().enumerate() {
        let distance = crowding_distance(population, front);
        for (&i, &d) in front.iter().zip(&distance) {
            rank[i] = r;
            crowding[i] = d;
        }
    }

    (0..k)
        .map(|_| {
            let a = rng.random_range(0..population.len());
            let b = rng.random_range(0..population.len());
            let winner = if rank[a] < rank[b] {
                a
            } else if rank[b] < rank[a] {
                b
            } else if crowding[a] >= crowding[b] {
                a
            } else {
                b
            };
            population[winner].clone()
        })
        .collect()
}

/// SPEA2 environmental selection: keep `k` individuals by strength-based
/// fitness, truncating an oversized non-dominated set by nearest-neighbor
/// distance.
#[must_use]
pub fn sel_spea2(population: &[Individual], k: usize) -> Vec<Individual> {
    let n = population.len();
    let fitness = spea2_fitness(population);

    // members with fitness < 1 are exactly the non-dominated set
    let mut archive: Vec<usize> = (0..n).filter(|&i| fitness[i] < 1.0).collect();
    if archive.len() < k {
        let mut rest: Vec<usize> = (0..n).filter(|&i| fitness[i] >= 1.0).collect();
        rest.sort_by(|&a, &b| fitness[a].total_cmp(&fitness[b]));
        archive.extend(rest.into_iter().take(k - archive.len()));
    } else if archive.len() > k {
        truncate_by_distance(population, &mut archive, k);
    }
    archive.into_iter().map(|i| population[i].clone()).collect()
}

/// SPEA2 fitness: raw dominator strength plus a k-th-nearest-neighbor
/// density term. Lower is better; non-dominated individuals score below 1.
#[must_use]
pub fn spea2_fitness(population: &[Individual]) -> Vec<f64> {
    let n = population.len();
    let mut strength = vec![0usize; n];
    for i in 0..n {
        for j in 0..n {
            if i != j && population[i].dominates(&population[j]) {
                strength[i] += 1;
            }
        }
    }
    let mut raw = vec![0.0f64; n];
    for i in 0..n {
        for j in 0..n {
            if i != j && population[j].dominates(&population[i]) {
                #[expect(clippy::cast_precision_loss)]
                {
                    raw[i] += strength[j] as f64;
                }
            }
        }
    }
    #[expect(clippy::cast_precision_loss, clippy::cast_possible_truncation,
             clippy::cast_sign_loss)]
    let kth = ((n as f64).sqrt() as usize).clamp(1, n.saturating_sub(1).max(1));
    (0..n)
        .map(|i| {
            let mut dists: Vec<f64> = (0..n)
                .filter(|&j| j != i)
                .map(|j| objective_distance(&population[i], &population[j]))
                .collect();
            dists.sort_by(f64::total_cmp);
            let sigma = dists.get(kth - 1).copied().unwrap_or(0.0);
            raw[i] + 1.0 / (sigma + 2.0)
        })
        .collect()
}

fn objective_distance(a: &Individual, b: &Individual) -> f64 {
    a.fitness()
        .iter()
        .zip(b.fitness())
        .map(|(x, y)| {
            let d = x - y;
            if d.is_finite() { d * d } else { f64::MAX }
        })
        .sum::<f64>()
        .sqrt()
}

/// Iteratively removes the archive member closest to its nearest neighbor
/// until `k` remain.
fn truncate_by_distance(population: &[Individual], archive: &mut Vec<usize>, k: usize) {
    while archive.len() > k {
        let mut victim = 0;
        let mut victim_dist = f64::INFINITY;
        for (pos, &i) in archive.iter().enumerate() {
            let nearest = archive
                .iter()
                .filter(|&&j| j != i)
                .map(|&j| objective_distance(&population[i], &population[j]))
                .fold(f64::INFINITY, f64::min);
            if nearest < victim_dist {
                victim_dist = nearest;
                victim = pos;
            }
        }
        archive.swap_remove(victim);
    }
}

#[cfg(test)]
mod tests {
    use evoctl_expr::Expr;
    use rand::SeedableRng as _;
    use rand_pcg::Pcg64Mcg;

    use super::*;

    fn pop(points: &[&[f64]]) -> Vec<Individual> {
        points
            .iter()
            .map(|p| {
                let mut ind = Individual::new(Expr::Var(0));
                ind.set_fitness(p.to_vec());
                ind
            })
            .collect()
    }

    #[test]
    fn sorting_separates_known_fronts() {
        // (1,4), (4,1) mutually non-dominating; (2,5) dominated by (1,4);
        // (5,5) dominated by everything in front 0
        let population = pop(&[&[1.0, 4.0], &[4.0, 1.0], &[2.0, 5.0], &[5.0, 5.0]]);
        let fronts = fast_non_dominated_sort(&population);
        assert_eq!(fronts.len(), 2);
        let mut f0 = fronts[0].clone();
        f0.sort_unstable();
        assert_eq!(f0, vec![0, 1]);
        let mut f1 = fronts[1].clone();
        f1.sort_unstable();
        assert_eq!(f1, vec![2, 3]);
    }

    #[test]
    fn crowding_favors_boundaries() {
        let population = pop(&[&[0.0, 3.0], &[1.0, 1.0], &[3.0, 0.0]]);
        let front = vec![0, 1, 2];
        let d = crowding_distance(&population, &front);
        assert_eq!(d[0], f64::INFINITY);
        assert_eq!(d[2], f64::INFINITY);
        assert!(d[1].is_finite());
    }

    #[test]
    fn nsga2_keeps_whole_first_front_when_it_fits() {
        let population = pop(&[&[1.0, 4.0], &[4.0, 1.0], &[2.0, 5.0], &[5.0, 5.0]]);
        let chosen = sel_nsga2(&population, 2);
        assert_eq!(chosen.len(), 2);
        for ind in &chosen {
            assert!(ind.fitness() == [1.0, 4.0] || ind.fitness() == [4.0, 1.0]);
        }
    }

    #[test]
    fn nsga2_truncates_by_crowding() {
        // all non-dominated; the middle point (least crowded neighbors) is cut
        let population = pop(&[&[0.0, 4.0], &[1.9, 2.1], &[2.0, 2.0], &[4.0, 0.0]]);
        let chosen = sel_nsga2(&population, 3);
        assert_eq!(chosen.len(), 3);
        let kept: Vec<&[f64]> = chosen.iter().map(Individual::fitness).collect();
        assert!(kept.contains(&[0.0, 4.0].as_slice()));
        assert!(kept.contains(&[4.0, 0.0].as_slice()));
    }

    #[test]
    fn tournament_prefers_lower_rank() {
        let population = pop(&[&[1.0, 1.0], &[5.0, 5.0]]);
        let mut rng = Pcg64Mcg::seed_from_u64(42);
        let selected = tournament_dcd(&population, 50, &mut rng);
        let winners = selected
            .iter()
            .filter(|ind| ind.fitness() == [1.0, 1.0])
            .count();
        // the dominated point can only win when drawn against itself
        assert!(winners > 25);
    }

    #[test]
    fn spea2_nondominated_score_below_one() {
        let population = pop(&[&[1.0, 4.0], &[4.0, 1.0], &[5.0, 5.0]]);
        let fitness = spea2_fitness(&population);
        assert!(fitness[0] < 1.0);
        assert!(fitness[1] < 1.0);
        assert!(fitness[2] >= 1.0);
    }

    #[test]
    fn spea2_selects_requested_count() {
        let population = pop(&[
            &[0.0, 4.0],
            &[1.0, 3.0],
            &[2.0, 2.0],
            &[3.0, 1.0],
            &[4.0, 0.0],
            &[5.0, 5.0],
        ]);
        for k in 1..=5 {
            assert_eq!(sel_spea2(&population, k).len(), k);
        }
    }
}
