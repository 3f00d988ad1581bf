//! Localized UI strings for empty and missing content.
use crate::locale::Language;
use crate::schema::EntityKind;

fn noun(kind: EntityKind, lang: Language) -> &'static str {
    use EntityKind::*;
    use Language::*;
    match (kind, lang) {
        (Product, En) => "products",
        (Product, Ar) => "منتجات",
        (Product, Fr) => "produits",
        (Recipe, En) => "recipes",
        (Recipe, Ar) => "وصفات",
        (Recipe, Fr) => "recettes",
        (BlogPost, En) => "blog posts",
        (BlogPost, Ar) => "مقالات",
        (BlogPost, Fr) => "articles",
        (Distributor, En) => "distributors",
        (Distributor, Ar) => "موزعين",
        (Distributor, Fr) => "distributeurs",
        (FaqItem, En) => "questions",
        (FaqItem, Ar) => "أسئلة",
        (FaqItem, Fr) => "questions",
        (Fact, En) => "facts",
        (Fact, Ar) => "حقائق",
        (Fact, Fr) => "faits",
        (FarmInfo, En) => "farm details",
        (FarmInfo, Ar) => "معلومات عن المزرعة",
        (FarmInfo, Fr) => "informations sur la ferme",
        (Discount, En) => "offers",
        (Discount, Ar) => "عروض",
        (Discount, Fr) => "offres",
        (Banner, En) => "banners",
        (Banner, Ar) => "لافتات",
        (Banner, Fr) => "bannières",
        (HeroSlide, En) => "slides",
        (HeroSlide, Ar) => "شرائح",
        (HeroSlide, Fr) => "diapositives",
        (SiteSettings, En) => "settings",
        (SiteSettings, Ar) => "إعدادات",
        (SiteSettings, Fr) => "paramètres",
        (AdminUser, En) => "users",
        (AdminUser, Ar) => "مستخدمين",
        (AdminUser, Fr) => "utilisateurs",
    }
}

/// Shown instead of an empty grid or table.
pub fn empty_state(kind: EntityKind, lang: Language) -> String {
    let noun = noun(kind, lang);
    match lang {
        Language::En => format!("No {noun} to show yet."),
        Language::Ar => format!("لا توجد {noun} لعرضها حالياً."),
        Language::Fr => format!("Aucun contenu pour le moment : {noun}."),
    }
}

/// Shown when a detail page's row does not exist.
pub fn not_found(kind: EntityKind, lang: Language) -> String {
    match lang {
        Language::En => format!("{} not found.", kind.label()),
        Language::Ar => "المحتوى المطلوب غير موجود.".to_string(),
        Language::Fr => "Contenu introuvable.".to_string(),
    }
}

/// Generic page-level 404 text.
pub fn page_not_found(lang: Language) -> &'static str {
    match lang {
        Language::En => "Page not found.",
        Language::Ar => "الصفحة غير موجودة.",
        Language::Fr => "Page introuvable.",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_kind_has_messages() {
        for kind in EntityKind::ALL {
            for lang in Language::ALL {
                assert!(!empty_state(kind, lang).is_empty());
                assert!(!not_found(kind, lang).is_empty());
            }
        }
        assert_eq!(empty_state(EntityKind::Product, Language::En), "No products to show yet.");
    }
}
