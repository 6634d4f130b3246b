//! Default configuration values and fixed numeric constants.

/// Default number of boosting iterations.
/// One tree is added per iteration.
pub const DEFAULT_NUM_ITERATIONS: usize = 100;

/// Default learning rate (shrinkage) for gradient boosting.
/// Also used as the weight of each tree in the model.
pub const DEFAULT_LEARNING_RATE: f64 = 0.1;

/// Default maximum tree depth, counting the root as depth 1.
pub const DEFAULT_MAX_DEPTH: usize = 9;

/// Smallest accepted `max_depth`.
pub const MIN_MAX_DEPTH: usize = 2;

/// Largest accepted `max_depth`.
/// Binary node ids are 64-bit, so deeper trees would overflow them.
pub const MAX_TREE_DEPTH: usize = 62;

/// Default number of candidate nodes evaluated per growth round.
pub const DEFAULT_MAX_SPLITS: usize = 256;

/// Default minimum number of samples on each side of a split.
pub const DEFAULT_MIN_DATA_IN_LEAF: usize = 1;

/// Default minimum split gain required to split a node.
pub const DEFAULT_MIN_GAIN_TO_SPLIT: f64 = 1e-6;

/// Default impurity below which a child is made a leaf immediately.
pub const DEFAULT_MIN_IMPURITY_TO_SPLIT: f64 = 1e-6;

/// Default verbosity (Info).
pub const DEFAULT_VERBOSITY: i32 = 1;

/// Default maximum number of bins for feature discretization.
pub const DEFAULT_MAX_BIN: usize = 255;

/// Hard upper bound on bins per feature; bin ids are stored in a byte.
pub const MAX_BIN_LIMIT: usize = 255;

/// Default minimum samples per bin. Accepted for compatibility, not used
/// by the quantile binner.
pub const DEFAULT_MIN_DATA_IN_BIN: usize = 3;

/// Default model output path (serialization is not supported).
pub const DEFAULT_OUTPUT_MODEL: &str = "model.txt";

/// Default prediction output path.
pub const DEFAULT_OUTPUT_RESULT: &str = "predict_result.txt";

/// Default sigmoid scale for the pairwise LambdaRank loss.
pub const DEFAULT_SIGMOID: f64 = 1.0;

/// Default truncation position for the ideal DCG normalizer.
pub const DEFAULT_MAX_POSITION: usize = 20;

/// Default largest relevance label.
pub const DEFAULT_MAX_LABEL: usize = 5;

/// Largest supported relevance label; `2^31 - 1` would overflow the gain table.
pub const MAX_SUPPORTED_LABEL: usize = 30;

/// Default NDCG cutoffs reported during training.
pub const DEFAULT_EVAL_AT: [usize; 4] = [1, 3, 5, 10];

/// Default evaluation interval in iterations.
pub const DEFAULT_EVAL_INTERVAL: usize = 1;

/// Default number of features scanned per pass over the samples.
pub const DEFAULT_NUM_FEATURE_BLOCKING: usize = 4;

/// Default number of worker threads. 0 means all available cores.
pub const DEFAULT_NUM_THREADS: usize = 1;

/// Default absolute bound on a leaf output.
pub const DEFAULT_MAX_LEAF_OUTPUT: f64 = 100.0;

/// Added to the leaf output denominator so empty-hessian leaves stay finite.
pub const LEAF_OUTPUT_EPSILON: f64 = 1e-15;

/// Number of entries in the sigmoid lookup table (2^20).
pub const SIGMOID_TABLE_BINS: usize = 1 << 20;

/// The sigmoid table covers `[-SIGMOID_INPUT_RANGE / sigmoid / 2,
/// SIGMOID_INPUT_RANGE / sigmoid / 2]`; inputs outside are clamped.
pub const SIGMOID_INPUT_RANGE: f64 = 50.0;

/// Score regularization added to `|delta_score|` when scaling pair weights.
pub const SCORE_DISTANCE_OFFSET: f64 = 0.01;

/// Minimum share of samples in the most frequent bin before a column is
/// stored in the sparse (default-bin) layout.
pub const DEFAULT_BIN_SPARSE_THRESHOLD: f64 = 0.8;

/// Version banner printed by the command line tool.
pub const VERSION_BANNER: &str = "LambdaMART 0.1";
