//! Static reference data for the city modules: the 81-province plate map
//! and the per-digit symbolic meaning tables.

use crate::types::Lang;

/// Province names indexed by plate code minus one (01 → index 0).
static CITY_NAMES: [&str; 81] = [
    "Adana", "Adıyaman", "Afyonkarahisar", "Ağrı", "Amasya", "Ankara",
    "Antalya", "Artvin", "Aydın", "Balıkesir", "Bilecik", "Bingöl", "Bitlis",
    "Bolu", "Burdur", "Bursa", "Çanakkale", "Çankırı", "Çorum", "Denizli",
    "Diyarbakır", "Edirne", "Elazığ", "Erzincan", "Erzurum", "Eskişehir",
    "Gaziantep", "Giresun", "Gümüşhane", "Hakkari", "Hatay", "Isparta",
    "Mersin", "İstanbul", "İzmir", "Kars", "Kastamonu", "Kayseri",
    "Kırklareli", "Kırşehir", "Kocaeli", "Konya", "Kütahya", "Malatya",
    "Manisa", "Kahramanmaraş", "Mardin", "Muğla", "Muş", "Nevşehir", "Niğde",
    "Ordu", "Rize", "Sakarya", "Samsun", "Siirt", "Sinop", "Sivas",
    "Tekirdağ", "Tokat", "Trabzon", "Tunceli", "Şanlıurfa", "Uşak", "Van",
    "Yozgat", "Zonguldak", "Aksaray", "Bayburt", "Karaman", "Kırıkkale",
    "Batman", "Şırnak", "Bartın", "Ardahan", "Iğdır", "Yalova", "Karabük",
    "Kilis", "Osmaniye", "Düzce",
];

/// Look up the province for a validated plate number (1–81).
pub fn city_name(plate: u8) -> Option<&'static str> {
    if (1..=81).contains(&plate) {
        Some(CITY_NAMES[plate as usize - 1])
    } else {
        None
    }
}

/// Symbolic name + meaning for a single digit 0–9.
static DIGITS_TR: [(&str, &str); 10] = [
    ("Rahim", "Boşluk, kaynak, saklı potansiyel"),
    ("Rahman", "İrade, başlatan kıvılcım"),
    ("Dualite", "Ayna, iki kutup, seçim"),
    ("Yaratım", "Söz, form, doğum"),
    ("Düzen", "Sınır, yapı, temel"),
    ("Eşik", "Değişim, cesaret, geçiş"),
    ("Aşk", "Uyum, denge, kalp"),
    ("Sır", "Arınma, test, içe dönüş"),
    ("Kudret", "Otorite, kader, yoğun güç"),
    ("Tamamlanış", "Bırakış, arınma, kapanış"),
];

static DIGITS_EN: [(&str, &str); 10] = [
    ("Womb", "Void, source, hidden potential"),
    ("Breath", "Will, first spark"),
    ("Duality", "Mirror, polarity, choice"),
    ("Creation", "Word, form, birth"),
    ("Order", "Structure, boundary, foundation"),
    ("Threshold", "Change, courage, crossing"),
    ("Love", "Harmony, balance, heart"),
    ("Mystery", "Purification, test, inward"),
    ("Power", "Authority, destiny, dense force"),
    ("Completion", "Release, cleansing, closure"),
];

/// (name, meaning) for a digit in the requested language.
/// Digits outside 0–9 wrap via mod 10 so callers never panic.
pub fn digit_meaning(digit: u8, lang: Lang) -> (&'static str, &'static str) {
    let d = (digit % 10) as usize;
    match lang {
        Lang::Tr => DIGITS_TR[d],
        Lang::En => DIGITS_EN[d],
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plate_bounds() {
        assert_eq!(city_name(1), Some("Adana"));
        assert_eq!(city_name(34), Some("İstanbul"));
        assert_eq!(city_name(81), Some("Düzce"));
        assert_eq!(city_name(0), None);
        assert_eq!(city_name(82), None);
    }

    #[test]
    fn digit_meanings_localized() {
        assert_eq!(digit_meaning(2, Lang::En).0, "Duality");
        assert_eq!(digit_meaning(2, Lang::Tr).0, "Dualite");
        // wraps instead of panicking
        assert_eq!(digit_meaning(12, Lang::En).0, "Duality");
    }
}
