// Tuning constants shared by the core and its frontends.

// Tolerance when deciding a tracked pose still counts as unit-scaled
pub const SCALE_EPSILON: f32 = 1e-3;

// Side length of the fallback extent used for anchors with no geometry
pub const FALLBACK_EXTENT_SIZE: f32 = 1.0;
