use std::path::PathBuf;
use std::time::Duration;

use directories::UserDirs;
use serde::{Deserialize, Serialize};

/// Listing index: first page, 100 entries, wrapped in a jQuery callback.
pub const INDEX_URL: &str = "https://marknad.studentbostader.se/widgets/?pagination=0&paginationantal=100&callback=jQuery17109732211216157454_1492970171534&widgets%5B%5D=koerochprenumerationer%40STD&widgets%5B%5D=objektfilter%40lagenheter&widgets%5B%5D=objektsortering%40lagenheter&widgets%5B%5D=objektlista%40lagenheter&widgets%5B%5D=pagineringgonew%40lagenheter&widgets%5B%5D=pagineringlista%40lagenheter&widgets%5B%5D=pagineringgoold%40lagenheter&_=1492970171907";

/// Per-listing detail; `{refid}` is substituted before the request.
pub const DETAIL_URL_TEMPLATE: &str = "https://marknad.studentbostader.se/widgets/?refid={refid}&callback=&widgets[]=koerochprenumerationer@STD&widgets[]=objektinformation@lagenheter&widgets[]=objektforegaende&widgets[]=objektnasta&widgets[]=objektbilder&widgets[]=objektfritext&widgets[]=objektinformation@lagenheter&widgets[]=objektegenskaper&widgets[]=objektdokument&widgets[]=alert&widgets[]=objektintresse&widgets[]=objektintressestatus&widgets[]=objektkarta&_=1545230378811";

const DATA_DIR: &str = "apaato";
const DATABASE_FILE: &str = "accommodations_db.sqlite";

/// Endpoints and HTTP settings for the listing scraper
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScraperConfig {
    pub index_url: String,
    pub detail_url_template: String,
    /// Request timeout
    pub timeout: Duration,
    pub user_agent: String,
}

impl ScraperConfig {
    pub fn detail_url(&self, refid: &str) -> String {
        self.detail_url_template.replace("{refid}", refid)
    }
}

impl Default for ScraperConfig {
    fn default() -> Self {
        Self {
            index_url: INDEX_URL.to_string(),
            detail_url_template: DETAIL_URL_TEMPLATE.to_string(),
            timeout: Duration::from_secs(30),
            user_agent: "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36".to_string(),
        }
    }
}

/// `<documents>/apaato/accommodations_db.sqlite`, falling back to the home
/// directory when the platform has no documents folder.
pub fn default_database_path() -> Option<PathBuf> {
    let dirs = UserDirs::new()?;
    let base = dirs
        .document_dir()
        .map(PathBuf::from)
        .unwrap_or_else(|| dirs.home_dir().join("Documents"));
    Some(base.join(DATA_DIR).join(DATABASE_FILE))
}
