pub mod menu_item;
pub mod order;
pub mod order_line;
pub mod reservation;
pub mod site_setting;
