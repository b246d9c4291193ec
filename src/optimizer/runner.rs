use crate::config::SearchParams;
use crate::error::{RotaError, RotaResult};
use crate::optimizer::SchedulerConfig;
use crate::schedule::Schedule;
use rayon::prelude::*;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::debug;

pub struct OptimizationOptions {
    pub generations: usize,
    /// Mutation sizes are drawn from `[0, max_mutation_size)`.
    pub max_mutation_size: usize,
    /// Worker threads used for fitness evaluation.
    pub parallelism: usize,
}

impl Default for OptimizationOptions {
    fn default() -> Self {
        Self::from(&SearchParams::default())
    }
}

impl From<&SearchParams> for OptimizationOptions {
    fn from(params: &SearchParams) -> Self {
        Self {
            generations: params.generations,
            max_mutation_size: params.max_mutation_size,
            parallelism: params.parallelism,
        }
    }
}

pub struct OptimizationResult {
    /// Fittest schedule seen in any generation, not only the last one.
    pub best: Schedule,
    pub fitness: f64,
    /// Generations that ran to completion.
    pub generations: usize,
    pub cancelled: bool,
    /// Best fitness after the initial ranking and after each generation.
    pub history: Vec<f64>,
}

/// Receives the ranking at the top of every generation.
/// Returning false stops the search before the generation starts.
pub trait ProgressCallback: Send + Sync {
    fn on_generation(&self, generation: usize, best: f64, second: f64, worst: f64) -> bool;
}

pub struct SilentProgress;

impl ProgressCallback for SilentProgress {
    fn on_generation(&self, _: usize, _: f64, _: f64, _: f64) -> bool {
        true
    }
}

pub struct Optimizer {
    config: Arc<SchedulerConfig>,
    options: OptimizationOptions,
    pool: rayon::ThreadPool,
}

impl Optimizer {
    pub fn new(config: Arc<SchedulerConfig>, options: OptimizationOptions) -> RotaResult<Self> {
        if options.parallelism == 0 {
            return Err(RotaError::Config("parallelism must be at least 1".into()));
        }
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(options.parallelism)
            .thread_name(|i| format!("rotaforge-eval-{}", i))
            .build()
            .map_err(|e| RotaError::ThreadPool(e.to_string()))?;

        Ok(Self {
            config,
            options,
            pool,
        })
    }

    pub fn config(&self) -> &Arc<SchedulerConfig> {
        &self.config
    }

    /// Population indices ranked by descending fitness.
    fn evaluate(&self, population: &[Schedule]) -> Vec<(usize, f64)> {
        let config = &self.config;
        let mut ranking: Vec<(usize, f64)> = self.pool.install(|| {
            population
                .par_iter()
                .enumerate()
                .map(|(i, s)| (i, config.compute_fitness(s)))
                .collect()
        });
        ranking.sort_by(|a, b| b.1.total_cmp(&a.1));
        ranking
    }

    /// Fittest of `tournament_size` uniform draws (with replacement).
    fn tournament(&self, ranking: &[(usize, f64)]) -> usize {
        let random = self.config.registry().random();
        let mut winner = ranking[random.next_index(ranking.len())];
        for _ in 1..self.config.tournament_size() {
            let candidate = ranking[random.next_index(ranking.len())];
            if candidate.1 > winner.1 {
                winner = candidate;
            }
        }
        winner.0
    }

    /// Runs the generational search.
    ///
    /// `last_best` replaces the first random candidate and must span the
    /// same key sequence (see [`Schedule::fit_to_window`]). `cancel` is
    /// polled once at the top of every generation.
    pub fn run<CB: ProgressCallback>(
        &self,
        last_best: Option<Schedule>,
        cancel: &AtomicBool,
        callback: &CB,
    ) -> RotaResult<OptimizationResult> {
        let config = &self.config;
        let opts = &self.options;
        let n = config.population();
        let elite = config.elite_size();
        let random = config.registry().random();

        // 1. Initial population
        let mut population: Vec<Schedule> = (0..n).map(|_| config.make_random()).collect();
        if let Some(seed) = last_best {
            if seed.len() != population[0].len() {
                return Err(RotaError::LengthMismatch {
                    left: seed.len(),
                    right: population[0].len(),
                });
            }
            population[0] = seed;
        }

        // 2. Initial ranking
        let mut ranking = self.evaluate(&population);
        let mut best = population[ranking[0].0].clone();
        let mut best_fitness = ranking[0].1;
        let mut history = Vec::with_capacity(opts.generations + 1);
        history.push(best_fitness);

        let mut completed = 0;
        let mut cancelled = false;

        // 3. Generations
        for generation in 0..opts.generations {
            let top = ranking[0].1;
            let second = ranking.get(1).map_or(top, |r| r.1);
            let worst = ranking[ranking.len() - 1].1;
            let keep_going = callback.on_generation(generation, top, second, worst);

            if !keep_going || cancel.load(Ordering::Relaxed) {
                cancelled = true;
                break;
            }

            // A. Elites carry over unchanged
            let mut next: Vec<Schedule> = Vec::with_capacity(n);
            next.extend(ranking.iter().take(elite).map(|&(i, _)| population[i].clone()));

            // B. Tournament parents, crossed and constrained
            while next.len() < n {
                let p1 = self.tournament(&ranking);
                let p2 = self.tournament(&ranking);
                let child = population[p1].cross(&population[p2])?;
                next.push(config.constrain(&child));
            }

            // C. Mutate everything but the elites
            for s in next.iter_mut().skip(elite) {
                let size = random.next_index(opts.max_mutation_size);
                *s = config.constrain(&s.mutate(size));
            }

            // D. Re-rank
            population = next;
            ranking = self.evaluate(&population);
            completed += 1;

            if ranking[0].1 > best_fitness {
                best_fitness = ranking[0].1;
                best = population[ranking[0].0].clone();
                debug!("Gen {}: new best {}", generation, best_fitness);
            }
            history.push(best_fitness);
        }

        Ok(OptimizationResult {
            best,
            fitness: best_fitness,
            generations: completed,
            cancelled,
            history,
        })
    }
}
