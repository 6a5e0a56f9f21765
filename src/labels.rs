//! Static field-key vocabularies: backend Arabic keys, the fixed English
//! label set used by the insights view, and Arabic display labels.

/// English field name -> Arabic display label for the insights view.
const DISPLAY_LABELS: &[(&str, &str)] = &[
    ("name", "الاسم"),
    ("full_name", "الاسم الكامل"),
    ("main_name", "الاسم الرئيسي"),
    ("date", "التاريخ"),
    ("gregorian_date", "التاريخ الميلادي"),
    ("hijri_date", "التاريخ الهجري"),
    ("document_number", "رقم المستند"),
    ("document_type", "نوع الوثيقة"),
    ("issuing_authority", "الجهة الصادرة"),
    ("official", "المسؤول"),
    ("subject", "الموضوع"),
    ("address", "العنوان"),
    ("location", "المكان"),
    ("nationality", "الجنسية"),
    ("id_number", "رقم الهوية"),
    ("passport_number", "رقم جواز السفر"),
    ("phone", "رقم الهاتف"),
    ("email", "البريد الإلكتروني"),
    ("birth_date", "تاريخ الميلاد"),
    ("place_of_birth", "مكان الميلاد"),
    ("issue_date", "تاريخ الإصدار"),
    ("expiry_date", "تاريخ الانتهاء"),
    ("registration_number", "رقم التسجيل"),
    ("reference_number", "رقم المرجع"),
    ("serial_number", "الرقم التسلسلي"),
    ("amount", "المبلغ"),
    ("personal_names", "الأسماء الشخصية"),
    ("organizations", "المؤسسات"),
    ("profession", "المهنة"),
    ("notes", "ملاحظات"),
    ("signature", "التوقيع"),
];

/// Backend Arabic key (current and legacy spellings) -> English label.
const ENGLISH_LABELS: &[(&str, &str)] = &[
    ("رقم_المستند", "Document Number"),
    ("رقم_الوثيقة", "Document Number"),
    ("التاريخ", "Date"),
    ("التاريخ_الميلادي", "Gregorian Date"),
    ("التاريخ_الهجري", "Hijri Date"),
    ("نوع_الوثيقة", "Document Type"),
    ("الجهة_الصادرة", "Issuing Authority"),
    ("الاسم_الرئيسي", "Main Name"),
    ("الاسم", "Name"),
    ("الاسم_الكامل", "Full Name"),
    ("المسؤول", "Official"),
    ("الموضوع", "Subject"),
    ("العنوان", "Address"),
    ("المكان", "Location"),
    ("الجنسية", "Nationality"),
    ("رقم_الهوية", "ID Number"),
    ("رقم_الهاتف", "Phone Number"),
    ("تاريخ_الميلاد", "Birth Date"),
    ("مكان_الميلاد", "Place of Birth"),
    ("تاريخ_الإصدار", "Issue Date"),
    ("تاريخ_الانتهاء", "Expiry Date"),
    ("رقم_التسجيل", "Registration Number"),
    ("رقم_المرجع", "Reference Number"),
    ("الرقم_التسلسلي", "Serial Number"),
    ("الأسماء_الشخصية", "Personal Names"),
    ("المؤسسات", "Organizations"),
    ("المهنة", "Profession"),
    ("ملاحظات", "Notes"),
];

/// Arabic display label for a known English field name (case-insensitive).
/// Unknown keys come back unchanged.
pub fn display_label(key: &str) -> String {
    let lookup = key.trim().to_lowercase();
    DISPLAY_LABELS
        .iter()
        .find(|(en, _)| *en == lookup)
        .map(|(_, ar)| (*ar).to_string())
        .unwrap_or_else(|| key.to_string())
}

/// English label for a backend Arabic key. Unknown keys degrade to the key
/// with underscores replaced by spaces.
pub fn english_label(arabic_key: &str) -> String {
    let lookup = arabic_key.trim();
    ENGLISH_LABELS
        .iter()
        .find(|(ar, _)| *ar == lookup)
        .map(|(_, en)| (*en).to_string())
        .unwrap_or_else(|| lookup.replace('_', " "))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_label_known_key() {
        assert_eq!(display_label("document_number"), "رقم المستند");
        assert_eq!(display_label("name"), "الاسم");
    }

    #[test]
    fn display_label_is_case_insensitive() {
        assert_eq!(display_label("Document_Number"), "رقم المستند");
        assert_eq!(display_label("  DATE  "), "التاريخ");
    }

    #[test]
    fn display_label_unknown_key_returns_input() {
        assert_eq!(display_label("mystery_field"), "mystery_field");
        assert_eq!(display_label(""), "");
    }

    #[test]
    fn english_label_known_key() {
        assert_eq!(english_label("رقم_المستند"), "Document Number");
        assert_eq!(english_label("الجهة_الصادرة"), "Issuing Authority");
    }

    #[test]
    fn english_label_legacy_spelling() {
        assert_eq!(english_label("رقم_الوثيقة"), "Document Number");
    }

    #[test]
    fn english_label_unknown_key_replaces_underscores() {
        assert_eq!(english_label("حقل_غير_معروف"), "حقل غير معروف");
        assert_eq!(english_label("custom_key"), "custom key");
    }

    #[test]
    fn both_lookups_are_total() {
        for input in ["", "_", "؟؟", "a_b_c", "ملاحظات"] {
            let _ = display_label(input);
            let _ = english_label(input);
        }
    }
}
