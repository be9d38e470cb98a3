use anyhow::Result;
use tray_icon::menu::{Menu, MenuId, MenuItem, PredefinedMenuItem};

use crate::labels::TrayLabels;
use crate::model::MenuAction;

const MENU_ID_SHOW: &str = "show";
const MENU_ID_QUIT: &str = "quit";

pub fn build_menu(labels: &TrayLabels) -> Result<Menu> {
    let menu = Menu::new();

    let show_item = MenuItem::with_id(MENU_ID_SHOW, &labels.show, true, None);
    menu.append(&show_item)?;
    menu.append(&PredefinedMenuItem::separator())?;
    let quit_item = MenuItem::with_id(MENU_ID_QUIT, &labels.quit, true, None);
    menu.append(&quit_item)?;

    Ok(menu)
}

pub fn parse_menu_action(id: &MenuId) -> Option<MenuAction> {
    match id.as_ref() {
        MENU_ID_SHOW => Some(MenuAction::Show),
        MENU_ID_QUIT => Some(MenuAction::Quit),
        _ => None,
    }
}
