use futures::stream::{self, Stream, StreamExt};
use tracing::{debug, info};

use crate::config::ScraperConfig;
use crate::error::Result;
use crate::models::{Accommodation, ListingDetails};
use crate::scrapers::extract::{
    parse_deadline, parse_floor, parse_queue, parse_rent, parse_size, unwrap_envelope,
};
use crate::scrapers::http::HttpTransport;
use crate::scrapers::traits::Transport;
use crate::scrapers::types::{DetailResponse, IndexEntry, IndexResponse};

/// Scraper for the studentbostader.se listing widgets
pub struct StudentbostaderScraper<T = HttpTransport> {
    transport: T,
    config: ScraperConfig,
}

impl StudentbostaderScraper<HttpTransport> {
    /// Create a scraper against the production portal
    pub fn new() -> Result<Self> {
        Self::with_config(ScraperConfig::default())
    }

    pub fn with_config(config: ScraperConfig) -> Result<Self> {
        let transport = HttpTransport::new(&config)?;
        Ok(Self { transport, config })
    }
}

impl<T: Transport> StudentbostaderScraper<T> {
    pub fn with_transport(transport: T, config: ScraperConfig) -> Self {
        Self { transport, config }
    }

    /// Fetch the listing index. One request; details are fetched lazily
    /// through [`ListingIndex::accommodations`].
    pub async fn fetch_index(&self) -> Result<ListingIndex<'_, T>> {
        info!("Fetching listing index");

        let body = self.transport.get_text(&self.config.index_url).await?;
        let response: IndexResponse = serde_json::from_str(unwrap_envelope(&body)?)?;
        let entries = response.data.listings;

        info!("Found {} listings", entries.len());
        Ok(ListingIndex {
            scraper: self,
            entries,
        })
    }

    /// Fetch the detail page for one index entry and build the full record.
    pub async fn fetch_accommodation(&self, entry: &IndexEntry) -> Result<Accommodation> {
        // Index fields first, so a bad entry fails before its request goes out.
        let details = ListingDetails {
            url: entry.detail_url.clone(),
            kind: entry.kind.clone(),
            location: entry.area.clone(),
            rent: parse_rent(&entry.rent)?,
            elevator: entry.elevator.clone(),
            floor: parse_floor(&entry.floor, &entry.address)?,
        };
        let size = parse_size(&entry.size)?;

        let refid = entry.refid();
        debug!("Fetching details for {} ({})", entry.address, refid);
        let body = self.transport.get_text(&self.config.detail_url(refid)).await?;
        let detail: DetailResponse = serde_json::from_str(unwrap_envelope(&body)?)?;

        let queue = parse_queue(&detail.html.queue_status)?;
        let deadline = parse_deadline(&detail.html.deadline_text);
        debug!(
            "{}: {} applicants, deadline {}",
            entry.address, queue.applicants, deadline
        );

        Ok(Accommodation::new(
            entry.address.clone(),
            refid,
            size,
            deadline,
            queue.applicants,
            queue.points,
        )
        .with_details(details))
    }
}

/// The listing index of one fetch run.
pub struct ListingIndex<'a, T> {
    scraper: &'a StudentbostaderScraper<T>,
    entries: Vec<IndexEntry>,
}

impl<'a, T: Transport> ListingIndex<'a, T> {
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn entries(&self) -> &[IndexEntry] {
        &self.entries
    }

    /// Records in index order, one detail request per item.
    ///
    /// Requests are issued one at a time as the stream is polled. An error
    /// is yielded in place of the failing listing; the caller decides whether
    /// to keep polling.
    pub fn accommodations(&self) -> impl Stream<Item = Result<Accommodation>> + '_ {
        let scraper: &StudentbostaderScraper<T> = self.scraper;
        stream::iter(&self.entries).then(move |entry| scraper.fetch_accommodation(entry))
    }
}
