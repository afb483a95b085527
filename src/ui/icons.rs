pub struct Icons;

impl Icons {
    pub const DOG: &str = "🐕";
    pub const CHECK: &str = "✅";
    pub const CROSS: &str = "❌";
    pub const WARN: &str = "⚠️";
    pub const INFO: &str = "ℹ️";
    pub const STATS: &str = "📊";
    pub const WATER: &str = "🌊";
    pub const MOUNTAIN: &str = "🏔️";
    pub const DISASTER: &str = "🚨";
    pub const GLOBE: &str = "🌍";
}
