use crate::pair::PairProcessor;

pub struct AppState {
    pub processor: PairProcessor,
}
