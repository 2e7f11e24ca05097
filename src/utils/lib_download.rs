use std::{
    ffi::OsString,
    fs::{self, File},
    io::Write,
    path::{Path, PathBuf},
    time::Duration,
};

use log::warn;
use reqwest::blocking::Client;

use crate::error::TripDataError;

pub const USER_AGENT: &str = concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"));

/// Something that can fetch the body of a url.
pub trait Downloader {
    /// Issue a GET request and write the response body into `out`.
    /// Any non-2xx status is an error.  Returns the number of bytes written.
    fn download(&self, url: &str, out: &mut dyn Write) -> Result<u64, TripDataError>;
}

pub struct HttpDownloader {
    client: Client,
}

impl HttpDownloader {
    /// The trip files can be several hundred MB, so there is no request timeout.
    pub fn new() -> Result<Self, TripDataError> {
        let client = Client::builder()
            .user_agent(USER_AGENT)
            .timeout(None::<Duration>)
            .build()?;
        Ok(HttpDownloader { client })
    }
}

impl Downloader for HttpDownloader {
    fn download(&self, url: &str, out: &mut dyn Write) -> Result<u64, TripDataError> {
        let mut response = self.client.get(url).send()?;
        let status = response.status();
        if !status.is_success() {
            return Err(TripDataError::HttpStatus {
                url: url.to_string(),
                status,
            });
        }
        Ok(response.copy_to(out)?)
    }
}

/// Where the bytes go while a download is in progress, e.g. `2025-03.parquet.part`.
pub fn part_path(file_path: &Path) -> PathBuf {
    let mut name: OsString = file_path
        .file_name()
        .map(|e| e.to_os_string())
        .unwrap_or_default();
    name.push(".part");
    file_path.with_file_name(name)
}

/// Download the url to `file_path`, creating parent directories as needed.
///
/// The body is written to a `.part` file first and renamed into place once
/// complete, so `file_path` only ever exists with the full content.  A stale
/// `.part` file from an interrupted run gets overwritten.
pub fn download_file(
    downloader: &dyn Downloader,
    url: &str,
    file_path: &Path,
) -> Result<u64, TripDataError> {
    if let Some(dir) = file_path.parent() {
        fs::create_dir_all(dir)?;
    }
    let part = part_path(file_path);
    let mut out = File::create(&part)?;
    let res = downloader
        .download(url, &mut out)
        .and_then(|n| out.sync_all().map(|_| n).map_err(TripDataError::from));
    drop(out);
    match res {
        Ok(n) => {
            fs::rename(&part, file_path)?;
            Ok(n)
        }
        Err(e) => {
            if let Err(rm) = fs::remove_file(&part) {
                warn!("Failed to remove {}: {}", part.display(), rm);
            }
            Err(e)
        }
    }
}

#[cfg(test)]
mod tests {

    use super::*;
    use reqwest::StatusCode;
    use std::error::Error;
    use wiremock::matchers::{header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    struct StaticDownloader(Result<&'static [u8], StatusCode>);

    impl Downloader for StaticDownloader {
        fn download(&self, url: &str, out: &mut dyn Write) -> Result<u64, TripDataError> {
            match self.0 {
                Ok(body) => {
                    out.write_all(body)?;
                    Ok(body.len() as u64)
                }
                Err(status) => Err(TripDataError::HttpStatus {
                    url: url.to_string(),
                    status,
                }),
            }
        }
    }

    #[test]
    fn part_path_test() {
        assert_eq!(
            part_path(Path::new("/data/yellow/2025-03.parquet")),
            PathBuf::from("/data/yellow/2025-03.parquet.part")
        );
    }

    #[test]
    fn download_writes_file() -> Result<(), Box<dyn Error>> {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("a/b/2025-03.parquet");
        let n = download_file(&StaticDownloader(Ok(&b"PAR1"[..])), "http://x", &path)?;
        assert_eq!(n, 4);
        assert_eq!(fs::read(&path)?, b"PAR1");
        assert!(!part_path(&path).exists());
        Ok(())
    }

    #[test]
    fn failed_download_leaves_nothing() -> Result<(), Box<dyn Error>> {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("2025-03.parquet");
        let res = download_file(
            &StaticDownloader(Err(StatusCode::FORBIDDEN)),
            "http://x",
            &path,
        );
        assert!(matches!(
            res,
            Err(TripDataError::HttpStatus { status, .. }) if status == StatusCode::FORBIDDEN
        ));
        assert!(!path.exists());
        assert!(!part_path(&path).exists());
        Ok(())
    }

    #[test]
    fn stale_part_file_is_overwritten() -> Result<(), Box<dyn Error>> {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("2025-03.parquet");
        fs::write(part_path(&path), b"truncated garbage")?;
        download_file(&StaticDownloader(Ok(&b"PAR1"[..])), "http://x", &path)?;
        assert_eq!(fs::read(&path)?, b"PAR1");
        Ok(())
    }

    /// reqwest's blocking client can't run on the async test runtime, so the
    /// downloads happen on a blocking thread against the local server.
    #[tokio::test(flavor = "multi_thread")]
    async fn http_downloader_local_server() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/trip-data/yellow_tripdata_2025-03.parquet"))
            .and(header("user-agent", USER_AGENT))
            .respond_with(ResponseTemplate::new(200).set_body_bytes(b"PAR1 trip rows".to_vec()))
            .expect(2)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/trip-data/green_tripdata_2025-03.parquet"))
            .respond_with(ResponseTemplate::new(404))
            .expect(2)
            .mount(&server)
            .await;
        let found = format!("{}/trip-data/yellow_tripdata_2025-03.parquet", server.uri());
        let missing = format!("{}/trip-data/green_tripdata_2025-03.parquet", server.uri());

        tokio::task::spawn_blocking(move || {
            let downloader = HttpDownloader::new().unwrap();

            let mut body = Vec::new();
            let n = downloader.download(&found, &mut body).unwrap();
            assert_eq!(n, 14);
            assert_eq!(body, b"PAR1 trip rows");

            let res = downloader.download(&missing, &mut Vec::new());
            assert!(matches!(
                res,
                Err(TripDataError::HttpStatus { status, .. }) if status == StatusCode::NOT_FOUND
            ));

            let dir = tempfile::tempdir().unwrap();
            let yellow = dir.path().join("yellow/2025-03.parquet");
            download_file(&downloader, &found, &yellow).unwrap();
            assert_eq!(fs::read(&yellow).unwrap(), b"PAR1 trip rows");

            let green = dir.path().join("green/2025-03.parquet");
            assert!(download_file(&downloader, &missing, &green).is_err());
            assert!(!green.exists());
            assert!(!part_path(&green).exists());
        })
        .await
        .unwrap();
    }

    #[ignore]
    #[test]
    fn http_status_error() -> Result<(), Box<dyn Error>> {
        let downloader = HttpDownloader::new()?;
        let mut sink = Vec::new();
        let res = downloader.download(
            "https://d37ci6vzurychx.cloudfront.net/trip-data/yellow_tripdata_1900-01.parquet",
            &mut sink,
        );
        assert!(matches!(res, Err(TripDataError::HttpStatus { .. })));
        Ok(())
    }
}
