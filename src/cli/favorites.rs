use super::ui;
use crate::core::currency::currency_name;
use crate::core::{FavoritesList, FavoritesUpdate, RateSession};

pub enum FavoritesAction {
    List,
    Add(String),
    Remove(String),
    Move { code: String, position: usize },
}

pub async fn run(session: &RateSession, action: FavoritesAction) -> anyhow::Result<()> {
    let update = match action {
        FavoritesAction::List => {
            print_list(&session.favorites().await);
            return Ok(());
        }
        FavoritesAction::Add(code) => session.add_favorite(&code).await,
        FavoritesAction::Remove(code) => session.remove_favorite(&code).await,
        // Positions are 1-based on the command line
        FavoritesAction::Move { code, position } => {
            session
                .move_favorite(&code, position.saturating_sub(1))
                .await
        }
    };

    match update {
        FavoritesUpdate::Applied(list) => print_list(&list),
        FavoritesUpdate::Rejected(reason) => {
            println!("{}", ui::style_text(&reason.to_string(), ui::StyleType::Error));
        }
    }
    Ok(())
}

fn print_list(list: &FavoritesList) {
    if list.is_empty() {
        println!("No favorite currencies.");
        return;
    }
    println!("\n{}", ui::style_text("Favorites", ui::StyleType::Title));
    for (i, code) in list.as_slice().iter().enumerate() {
        let name = currency_name(code).unwrap_or("");
        println!(
            "{:>3}. {} {}",
            i + 1,
            code,
            ui::style_text(name, ui::StyleType::Subtle)
        );
    }
}
