// Wiki scraper: populates the entity and strategy collections from
// fandom-style wiki category pages.

// Leading colons disambiguate from this module's own path.
use ::scraper::{Html, Selector};
use serde::Serialize;
use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;

use crate::chat::retrieval::EntityType;
use crate::db::{Database, Game};

/// Delay between page fetches, to be nice to the wiki servers.
const PAGE_DELAY: Duration = Duration::from_secs(1);

/// What a category's pages are stored as.
enum CategoryKind {
    Strategy,
    Entity(EntityType),
}

/// Everything extracted from one wiki page.
struct ScrapedPage {
    title: String,
    content: String,
    properties: BTreeMap<String, String>,
}

/// Static definition of a game the setup operation can seed.
struct GameSeed {
    name: &'static str,
    description: &'static str,
    wiki_base_url: &'static str,
    category_paths: &'static [&'static str],
    icon_url: &'static str,
}

impl GameSeed {
    fn category_paths_json(&self) -> String {
        serde_json::to_string(self.category_paths).unwrap_or_else(|_| "[]".to_string())
    }
}

#[derive(Debug, Serialize)]
pub struct ScrapeOutcome {
    pub success: bool,
    pub message: String,
}

#[derive(Debug, thiserror::Error)]
pub enum ScrapeError {
    #[error("Game not found")]
    GameNotFound,
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("request error: {0}")]
    Http(#[from] reqwest::Error),
}

pub struct ScraperService {
    db: Arc<Database>,
    http: reqwest::Client,
    member_link: Selector,
    page_title: Selector,
    page_content: Selector,
    infobox_row: Selector,
    header_cell: Selector,
    data_cell: Selector,
}

impl ScraperService {
    pub fn new(db: Arc<Database>) -> Result<Self, reqwest::Error> {
        let http = reqwest::Client::builder()
            .user_agent("gamesage-backend/0.1")
            .timeout(Duration::from_secs(30))
            .build()?;

        Ok(Self {
            db,
            http,
            member_link: Selector::parse(".category-page__member-link").expect("valid selector"),
            page_title: Selector::parse(".page-header__title").expect("valid selector"),
            page_content: Selector::parse(".mw-parser-output").expect("valid selector"),
            infobox_row: Selector::parse(".infobox tr").expect("valid selector"),
            header_cell: Selector::parse("th").expect("valid selector"),
            data_cell: Selector::parse("td").expect("valid selector"),
        })
    }

    // ── Game seeding ──────────────────────────────────────────────────

    /// Seed the known games, skipping any that already exist.
    pub async fn setup_games(&self) -> Result<Vec<Game>, sqlx::Error> {
        let mut games = Vec::new();
        for seed in Self::game_seeds() {
            let game = match self.db.get_game_by_name(seed.name).await? {
                Some(existing) => existing,
                None => {
                    let game = self
                        .db
                        .create_game(
                            seed.name,
                            seed.description,
                            seed.wiki_base_url,
                            &seed.category_paths_json(),
                            Some(seed.icon_url),
                        )
                        .await?;
                    tracing::info!("Created game: {}", seed.name);
                    game
                }
            };
            games.push(game);
        }
        Ok(games)
    }

    fn game_seeds() -> &'static [GameSeed] {
        &[
            GameSeed {
                name: "Clash of Clans",
                description: "A mobile strategy game where players build villages, train troops, and attack other players.",
                wiki_base_url: "https://clashofclans.fandom.com",
                category_paths: &[
                    "/wiki/Category:Troops",
                    "/wiki/Category:Buildings",
                    "/wiki/Category:Spells",
                    "/wiki/Category:Heroes",
                ],
                icon_url: "https://play-lh.googleusercontent.com/LByrur1mTmPeNr0ljI-uAUcct1rzmTve5Esau1SwoAzjBXQUby6uHIfHbHWT83wU7g",
            },
            GameSeed {
                name: "Elden Ring",
                description: "An action RPG developed by FromSoftware and published by Bandai Namco Entertainment.",
                wiki_base_url: "https://eldenring.wiki.fextralife.com",
                category_paths: &[
                    "/wiki/Weapons",
                    "/wiki/Armor",
                    "/wiki/Bosses",
                    "/wiki/NPCs",
                ],
                icon_url: "https://upload.wikimedia.org/wikipedia/en/b/b9/Elden_Ring_Box_art.jpg",
            },
        ]
    }

    // ── Scraping ──────────────────────────────────────────────────────

    /// Scrape every category path configured for a game. Per-category and
    /// per-page failures are logged and skipped.
    pub async fn scrape_game(&self, game_id: i64) -> Result<ScrapeOutcome, ScrapeError> {
        let game = self
            .db
            .get_game(game_id)
            .await?
            .ok_or(ScrapeError::GameNotFound)?;

        tracing::info!("Scraping game: {}", game.name);

        for category_path in game.category_path_list() {
            if let Err(e) = self.scrape_category(&game, &category_path).await {
                tracing::error!("Error scraping category {category_path}: {e}");
            }
        }

        Ok(ScrapeOutcome {
            success: true,
            message: format!("Scraped game: {}", game.name),
        })
    }

    async fn scrape_category(&self, game: &Game, category_path: &str) -> Result<(), ScrapeError> {
        tracing::info!(
            "Scraping category: {category_path} for game: {}",
            game.name
        );
        let kind = category_kind(category_path);
        let page_urls = self.category_page_urls(&game.wiki_base_url, category_path).await?;

        for url in page_urls {
            if let Err(e) = self.scrape_page(game, &url, &kind).await {
                tracing::error!("Error scraping {url}: {e}");
            }
            tokio::time::sleep(PAGE_DELAY).await;
        }

        Ok(())
    }

    async fn category_page_urls(
        &self,
        base_url: &str,
        category_path: &str,
    ) -> Result<Vec<String>, reqwest::Error> {
        let body = self
            .http
            .get(format!("{base_url}{category_path}"))
            .send()
            .await?
            .error_for_status()?
            .text()
            .await?;

        Ok(self.extract_member_urls(&body, base_url))
    }

    /// Pull member-page links out of a category listing. Synchronous because
    /// the parsed document is not Send and must not live across an await.
    fn extract_member_urls(&self, body: &str, base_url: &str) -> Vec<String> {
        let document = Html::parse_document(body);
        document
            .select(&self.member_link)
            .filter_map(|link| link.value().attr("href"))
            .map(|href| format!("{base_url}{href}"))
            .collect()
    }

    async fn scrape_page(
        &self,
        game: &Game,
        url: &str,
        kind: &CategoryKind,
    ) -> Result<(), ScrapeError> {
        let body = self.http.get(url).send().await?.error_for_status()?.text().await?;

        let Some(page) = self.parse_page(&body) else {
            // Pages without a title header are skipped silently.
            return Ok(());
        };

        // Short description from the leading content, full text kept intact.
        let mut description: String = page.content.chars().take(200).collect();
        description.push_str("...");
        let scraped_at = chrono::Utc::now().to_rfc3339();

        match kind {
            CategoryKind::Strategy => {
                self.db
                    .create_strategy(
                        game.id,
                        &page.title,
                        &description,
                        &page.content,
                        "[]",
                        url,
                        &scraped_at,
                    )
                    .await?;
            }
            CategoryKind::Entity(entity_type) => {
                let properties =
                    serde_json::to_string(&page.properties).unwrap_or_else(|_| "{}".to_string());
                self.db
                    .create_entity(
                        game.id,
                        &page.title,
                        entity_type.as_str(),
                        &description,
                        url,
                        &properties,
                        &page.content,
                        &scraped_at,
                    )
                    .await?;
            }
        }

        tracing::info!("Scraped and saved: {}", page.title);
        Ok(())
    }

    fn parse_page(&self, body: &str) -> Option<ScrapedPage> {
        let document = Html::parse_document(body);

        let title = document
            .select(&self.page_title)
            .next()
            .map(|el| el.text().collect::<String>().trim().to_string())
            .unwrap_or_default();
        if title.is_empty() {
            return None;
        }

        let content = document
            .select(&self.page_content)
            .next()
            .map(|el| el.text().collect::<String>().trim().to_string())
            .unwrap_or_default();

        let mut properties = BTreeMap::new();
        for row in document.select(&self.infobox_row) {
            let header = row
                .select(&self.header_cell)
                .next()
                .map(|el| el.text().collect::<String>().trim().to_string())
                .unwrap_or_default();
            let data = row
                .select(&self.data_cell)
                .next()
                .map(|el| el.text().collect::<String>().trim().to_string())
                .unwrap_or_default();
            if !header.is_empty() && !data.is_empty() {
                properties.insert(header, data);
            }
        }

        Some(ScrapedPage {
            title,
            content,
            properties,
        })
    }
}

/// Map a category path to what its pages become. Customized per game later.
fn category_kind(category_path: &str) -> CategoryKind {
    if category_path.contains("Strategies") || category_path.contains("Strategy") {
        CategoryKind::Strategy
    } else if category_path.contains("Troops") || category_path.contains("Troop") {
        CategoryKind::Entity(EntityType::Troop)
    } else if category_path.contains("Buildings") || category_path.contains("Building") {
        CategoryKind::Entity(EntityType::Building)
    } else if category_path.contains("Spells") || category_path.contains("Spell") {
        CategoryKind::Entity(EntityType::Spell)
    } else if category_path.contains("Heroes") || category_path.contains("Hero") {
        CategoryKind::Entity(EntityType::Hero)
    } else {
        CategoryKind::Entity(EntityType::Other)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn service() -> ScraperService {
        let db = Arc::new(Database::new("sqlite::memory:").await.unwrap());
        ScraperService::new(db).unwrap()
    }

    #[test]
    fn test_category_kind_mapping() {
        assert!(matches!(
            category_kind("/wiki/Category:Strategies"),
            CategoryKind::Strategy
        ));
        assert!(matches!(
            category_kind("/wiki/Category:Troops"),
            CategoryKind::Entity(EntityType::Troop)
        ));
        assert!(matches!(
            category_kind("/wiki/Category:Heroes"),
            CategoryKind::Entity(EntityType::Hero)
        ));
        assert!(matches!(
            category_kind("/wiki/Weapons"),
            CategoryKind::Entity(EntityType::Other)
        ));
    }

    #[tokio::test]
    async fn test_extract_member_urls() {
        let svc = service().await;
        let body = r#"
            <div class="category-page__members">
              <a class="category-page__member-link" href="/wiki/Giant">Giant</a>
              <a class="category-page__member-link" href="/wiki/Wizard">Wizard</a>
              <a class="other-link" href="/wiki/Ignored">Ignored</a>
            </div>
        "#;
        let urls = svc.extract_member_urls(body, "https://clashofclans.fandom.com");
        assert_eq!(
            urls,
            vec![
                "https://clashofclans.fandom.com/wiki/Giant".to_string(),
                "https://clashofclans.fandom.com/wiki/Wizard".to_string(),
            ]
        );
    }

    #[tokio::test]
    async fn test_parse_page_extracts_title_content_and_infobox() {
        let svc = service().await;
        let body = r#"
            <h1 class="page-header__title">Giant</h1>
            <div class="mw-parser-output">Giants are slow but sturdy troops.</div>
            <table class="infobox">
              <tr><th>Damage</th><td>30</td></tr>
              <tr><th>Speed</th><td>12</td></tr>
              <tr><th>Empty</th><td></td></tr>
            </table>
        "#;
        let page = svc.parse_page(body).expect("page parsed");
        assert_eq!(page.title, "Giant");
        assert_eq!(page.content, "Giants are slow but sturdy troops.");
        assert_eq!(page.properties.get("Damage"), Some(&"30".to_string()));
        assert_eq!(page.properties.get("Speed"), Some(&"12".to_string()));
        assert!(!page.properties.contains_key("Empty"));
    }

    #[tokio::test]
    async fn test_parse_page_without_title_is_skipped() {
        let svc = service().await;
        assert!(svc.parse_page("<div>no header here</div>").is_none());
    }

    #[tokio::test]
    async fn test_setup_games_is_idempotent() {
        let db = Arc::new(Database::new("sqlite::memory:").await.unwrap());
        let svc = ScraperService::new(db.clone()).unwrap();

        let first = svc.setup_games().await.unwrap();
        assert_eq!(first.len(), 2);
        assert_eq!(first[0].name, "Clash of Clans");
        assert_eq!(first[1].name, "Elden Ring");

        let second = svc.setup_games().await.unwrap();
        assert_eq!(second.len(), 2);
        assert_eq!(db.list_games().await.unwrap().len(), 2);
    }
}
