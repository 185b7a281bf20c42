pub mod favorites_bar;
pub mod helpers;
pub mod info_panel;
pub mod palette;
pub mod toast;

pub use favorites_bar::{chip_areas, FavoritesBar};
pub use helpers::dim_area;
pub use info_panel::InfoPanelView;
pub use palette::{PaletteLayout, PaletteModal};
pub use toast::ToastView;
