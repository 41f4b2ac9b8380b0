// Environment keys
pub const ENV_PROXIMITY_DISTANCE: &str = "PROXIMITY_DISTANCE";
pub const ENV_SECURED_AREAS: &str = "SECURED_AREAS";
pub const ENV_VALID_PRECISION: &str = "VALID_PRECISION";
pub const ENV_LOCATION_COLUMN: &str = "LOCATION_COLUMN";

// Input columns
pub const DEFAULT_LOCATION_COLUMN: &str = "location";
pub const PRECISION_COLUMN: &str = "precision";
pub const TIME_COLUMN: &str = "time";
pub const VALID_COLUMN: &str = "valid";

// Workspace layout
pub const DATA_DIR_NAME: &str = "data";
pub const RESULT_DIR_NAME: &str = "result";
pub const DEFAULT_OUTPUT_FILE: &str = "map_points.html";
pub const CSV_EXTENSION: &str = "csv";

// Coordinate bounds (WGS84 degrees)
pub const MIN_LATITUDE: f64 = -90.0;
pub const MAX_LATITUDE: f64 = 90.0;
pub const MIN_LONGITUDE: f64 = -180.0;
pub const MAX_LONGITUDE: f64 = 180.0;

// Map presentation
pub const DEFAULT_ZOOM_START: u8 = 15;
pub const TILE_URL: &str = "https://{s}.basemaps.cartocdn.com/light_all/{z}/{x}/{y}{r}.png";
pub const TILE_ATTRIBUTION: &str = "&copy; OpenStreetMap contributors &copy; CARTO";
pub const ROUTE_WEIGHT: f64 = 2.5;
pub const ROUTE_OPACITY: f64 = 1.0;
pub const ZONE_FILL_OPACITY: f64 = 0.2;
pub const ALERT_FILL_OPACITY: f64 = 0.1;

// Marker styling
pub const ZONE_COLOR: &str = "blue";
pub const ALERT_COLOR: &str = "orange";
pub const INVALID_RECORD_COLOR: &str = "gray";
