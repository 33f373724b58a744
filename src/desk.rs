pub mod command {
    pub mod add_info_cmd;
    pub mod close_session_cmd;
    pub mod end_session_cmd;
    pub mod get_session_cmd;
    pub mod open_session_cmd;
    pub mod refresh_settings_cmd;
    pub mod resolve_modal_cmd;
    pub mod resolve_patron_cmd;
    pub mod scan_item_cmd;
    pub mod select_item_cmd;
    pub mod select_patron_cmd;
    pub mod submit_override_cmd;
}
pub mod controller;
pub mod domain;
pub mod factory;
pub mod registry;
pub mod session;
pub mod timer;
