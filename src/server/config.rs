use super::RequestsLoggingLevel;
use crate::analysis::AnalysisSettings;
use crate::motion::test_data::TestDataSettings;
use crate::motion::DEFAULT_BUFFER_CAPACITY;

#[derive(Clone)]
pub struct ServerConfig {
    pub requests_logging_level: RequestsLoggingLevel,
    pub port: u16,
    pub buffer_capacity: usize,
    pub analysis: AnalysisSettings,
    pub test_data: TestDataSettings,
}

impl Default for ServerConfig {
    fn default() -> Self {
        ServerConfig {
            requests_logging_level: RequestsLoggingLevel::Path,
            port: 3000,
            buffer_capacity: DEFAULT_BUFFER_CAPACITY,
            analysis: AnalysisSettings::default(),
            test_data: TestDataSettings::default(),
        }
    }
}
