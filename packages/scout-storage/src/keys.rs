pub const AUTH_TOKEN: &str = "auth_token";
pub const REFRESH_TOKEN: &str = "refresh_token";
pub const USER_DATA: &str = "user_data";
pub const SEARCH_HISTORY: &str = "search_history";
pub const FAVORITES: &str = "user_favorites";
pub const REPORT_FOLDERS: &str = "report_folders";
