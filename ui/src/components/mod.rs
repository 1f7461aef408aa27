pub mod app;
pub mod buy_view;
pub mod deeplink_handler;
pub mod home_view;
pub mod ledger_state;
pub mod local_store;
pub mod post_action_redirect;
pub mod receive_view;
pub mod send_view;
pub mod shared_state;
