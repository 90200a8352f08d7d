use serde::Deserialize;

use super::{parse_envelope, ApiError, HttpClient, VerseSource};
use crate::models::{AyahText, SurahInfo};

pub struct AlQuranClient {
    http: HttpClient,
    base_url: String,
}

impl AlQuranClient {
    pub fn new(http: HttpClient, base_url: &str) -> Self {
        Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SurahWire {
    number: u16,
    name: String,
    english_name: String,
    number_of_ayahs: u16,
}

pub(crate) fn parse_surah(body: &str) -> Result<SurahInfo, ApiError> {
    let s: SurahWire = parse_envelope(body)?;
    Ok(SurahInfo {
        number: s.number,
        english_name: s.english_name,
        name: s.name,
        ayah_count: s.number_of_ayahs,
    })
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct AyahSurahWire {
    english_name: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct AyahWire {
    text: String,
    number_in_surah: u16,
    surah: AyahSurahWire,
}

pub(crate) fn parse_ayah(body: &str) -> Result<AyahText, ApiError> {
    let a: AyahWire = parse_envelope(body)?;
    if a.text.trim().is_empty() {
        return Err(ApiError::Empty);
    }
    Ok(AyahText {
        text: a.text,
        surah_english_name: a.surah.english_name,
        number_in_surah: a.number_in_surah,
    })
}

impl VerseSource for AlQuranClient {
    fn surah(&self, number: u16) -> Result<SurahInfo, ApiError> {
        let url = format!("{}/surah/{}", self.base_url, number);
        parse_surah(&self.http.get_text(&url)?)
    }

    fn ayah(&self, surah: u16, ayah: u16, edition: Option<&str>) -> Result<AyahText, ApiError> {
        let url = match edition {
            Some(ed) => format!(
                "{}/ayah/{}:{}/{}",
                self.base_url,
                surah,
                ayah,
                urlencoding::encode(ed)
            ),
            None => format!("{}/ayah/{}:{}", self.base_url, surah, ayah),
        };
        parse_ayah(&self.http.get_text(&url)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn surah_metadata() {
        let body = r#"{"code":200,"status":"OK","data":{"number":2,"name":"سُورَةُ البَقَرَةِ",
            "englishName":"Al-Baqara","englishNameTranslation":"The Cow",
            "revelationType":"Medinan","numberOfAyahs":286,"ayahs":[]}}"#;
        let s = parse_surah(body).unwrap();
        assert_eq!(s.ayah_count, 286);
        assert_eq!(s.title(), "Al-Baqara (سُورَةُ البَقَرَةِ)");
    }

    #[test]
    fn unknown_surah_reports_not_found_code() {
        let body = r#"{"code":404,"status":"NOT FOUND","data":"Surah not found"}"#;
        assert!(matches!(parse_surah(body), Err(ApiError::Code(404))));
    }

    #[test]
    fn ayah_text() {
        let body = r#"{"code":200,"status":"OK","data":{"number":262,"text":"Allah - there is no deity except Him",
            "edition":{"identifier":"en.asad"},"surah":{"number":2,"englishName":"Al-Baqara"},
            "numberInSurah":255,"juz":3}}"#;
        let a = parse_ayah(body).unwrap();
        assert_eq!(a.number_in_surah, 255);
        assert_eq!(a.surah_english_name, "Al-Baqara");
    }

    #[test]
    fn blank_ayah_counts_as_missing() {
        let body = r#"{"code":200,"data":{"text":"  ","numberInSurah":1,"surah":{"englishName":"X"}}}"#;
        assert!(matches!(parse_ayah(body), Err(ApiError::Empty)));
    }
}
