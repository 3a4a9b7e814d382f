pub(crate) mod auth_panel;
pub(crate) mod editor_panel;
pub(crate) mod feed_panel;
