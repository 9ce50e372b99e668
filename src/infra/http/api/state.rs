use std::sync::Arc;

use crate::application::browse::BrowseService;
use crate::application::page::PageService;

#[derive(Clone)]
pub struct ApiState {
    pub pages: Arc<PageService>,
    pub browse: Arc<BrowseService>,
}

impl ApiState {
    pub fn new(pages: PageService, browse: BrowseService) -> Self {
        Self {
            pages: Arc::new(pages),
            browse: Arc::new(browse),
        }
    }
}
