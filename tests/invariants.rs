use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rpeak_rs::detection::merge_close_peaks;
use rpeak_rs::{
    post_process_batch, DistanceThreshold, Interval, Peak, PostProcessConfig, ProbabilityBatch,
};

const SEEDS: [u64; 6] = [1, 7, 42, 1234, 2021, 9001];
const BATCH_SIZE: usize = 4;
const FRAME_COUNT: usize = 3000;

/// Alternating quiet and active stretches, like a noisy sequence-labelling output.
fn random_probabilities(rng: &mut StdRng, frame_count: usize) -> Vec<f32> {
    let mut probs = Vec::with_capacity(frame_count);
    let mut active = false;
    while probs.len() < frame_count {
        let run = if active {
            rng.gen_range(1..30)
        } else {
            rng.gen_range(5..250)
        };
        for _ in 0..run.min(frame_count - probs.len()) {
            let p = if active {
                rng.gen_range(0.51f32..1.0)
            } else {
                rng.gen_range(0.0f32..0.5)
            };
            probs.push(p);
        }
        active = !active;
    }
    probs
}

fn random_batch(seed: u64) -> ProbabilityBatch {
    let mut rng = StdRng::seed_from_u64(seed);
    let rows = (0..BATCH_SIZE)
        .map(|_| random_probabilities(&mut rng, FRAME_COUNT))
        .collect::<Vec<_>>();
    ProbabilityBatch::from_rows(rows).expect("rectangular batch")
}

fn configs() -> Vec<PostProcessConfig> {
    vec![
        PostProcessConfig::default(),
        PostProcessConfig {
            dist_thr_ms: DistanceThreshold::Range {
                min_ms: 200.0,
                max_ms: 1200.0,
            },
            ..PostProcessConfig::default()
        },
        PostProcessConfig {
            fs_hz: 500.0,
            reduction: 4,
            dist_thr_ms: DistanceThreshold::Range {
                min_ms: 250.0,
                max_ms: 900.0,
            },
            skip_dist_ms: 250.0,
            ..PostProcessConfig::default()
        },
    ]
}

#[test]
fn output_is_deterministic() {
    for seed in SEEDS {
        let batch = random_batch(seed);
        for config in configs() {
            let first = post_process_batch(&batch, &config).unwrap();
            let second = post_process_batch(&batch, &config).unwrap();
            assert_eq!(first, second, "seed {seed}, config {config:?}");
        }
    }
}

#[test]
fn output_is_strictly_increasing_and_away_from_edges() {
    for seed in SEEDS {
        let batch = random_batch(seed);
        for config in configs() {
            let params = config.resolve(batch.frame_count());
            let rpeaks = post_process_batch(&batch, &config).unwrap();
            assert_eq!(rpeaks.len(), BATCH_SIZE);
            for element in &rpeaks {
                assert!(
                    element.windows(2).all(|pair| pair[0] < pair[1]),
                    "seed {seed}: not strictly increasing: {element:?}"
                );
                for &idx in element {
                    let idx = idx as f64;
                    assert!(idx >= params.skip_samples, "seed {seed}: {idx} too early");
                    assert!(
                        idx < params.input_len as f64 - params.skip_samples,
                        "seed {seed}: {idx} too late"
                    );
                }
            }
        }
    }
}

#[test]
fn single_threshold_output_respects_minimum_distance() {
    let config = PostProcessConfig::default();
    for seed in SEEDS {
        let batch = random_batch(seed);
        let min_dist = config.resolve(batch.frame_count()).min_dist_samples;
        for element in post_process_batch(&batch, &config).unwrap() {
            assert!(
                element
                    .windows(2)
                    .all(|pair| (pair[1] - pair[0]) as f64 >= min_dist),
                "seed {seed}: refractory violation in {element:?}"
            );
        }
    }
}

#[test]
fn re_merging_output_changes_nothing() {
    let config = PostProcessConfig::default();
    for seed in SEEDS {
        let batch = random_batch(seed);
        let params = config.resolve(batch.frame_count());
        let rpeaks = post_process_batch(&batch, &config).unwrap();
        for (element, probs) in rpeaks.iter().zip(batch.rows()) {
            let mut peaks = element
                .iter()
                .map(|&idx| Peak::new(idx, Interval::new(idx, idx + 1)))
                .collect::<Vec<_>>();
            let deleted =
                merge_close_peaks(&mut peaks, probs, params.reduction, params.min_dist_samples);
            assert_eq!(deleted, 0, "seed {seed}");
            assert_eq!(
                peaks.iter().map(|peak| peak.index).collect::<Vec<_>>(),
                *element
            );
        }
    }
}

#[test]
fn gap_filling_only_adds_peaks_between_existing_ones() {
    let single = PostProcessConfig::default();
    let range = PostProcessConfig {
        dist_thr_ms: DistanceThreshold::Range {
            min_ms: 200.0,
            max_ms: 1200.0,
        },
        ..PostProcessConfig::default()
    };
    for seed in SEEDS {
        let batch = random_batch(seed);
        let without = post_process_batch(&batch, &single).unwrap();
        let with = post_process_batch(&batch, &range).unwrap();
        for (base, filled) in without.iter().zip(with.iter()) {
            assert!(
                base.iter().all(|idx| filled.contains(idx)),
                "seed {seed}: gap filling removed a peak ({base:?} -> {filled:?})"
            );
            assert!(filled.len() >= base.len());
        }
    }
}

#[test]
fn one_dimensional_input_is_promoted_to_a_batch() {
    let mut rng = StdRng::seed_from_u64(3);
    let probs = random_probabilities(&mut rng, FRAME_COUNT);
    let single = ProbabilityBatch::from_single(probs.clone());
    let nested = ProbabilityBatch::from_rows(vec![probs]).unwrap();
    let config = PostProcessConfig::default();
    assert_eq!(
        post_process_batch(&single, &config).unwrap(),
        post_process_batch(&nested, &config).unwrap()
    );
}
