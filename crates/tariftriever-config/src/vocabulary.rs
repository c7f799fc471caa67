//! Default query vocabulary
//!
//! Both tables are plain data so deployments can replace them from the
//! config file without a rebuild.

use std::collections::BTreeMap;

/// Paperwork phrases users paste alongside the goods they mean
const ADMINISTRATIVE_TERMS: &[&str] = &[
    "критерий происхождения",
    "критерии происхождения",
    "товарное происхождение",
    "страна происхождения",
    "сертификат происхождения",
    "декларация происхождения",
    "подтверждение происхождения",
    "документ происхождения",
    "код тн вэд",
    "тн вэд",
    "гост",
    "ту",
    "классификация",
    "таможенное оформление",
    "таможенная процедура",
    "импорт",
    "экспорт",
    "ввоз",
    "вывоз",
    "сертификат качества",
    "сертификат соответствия",
    "санитарно-эпидемиологическое заключение",
    "фитосанитарный сертификат",
    "ветеринарный сертификат",
];

/// Base form followed by inflections and frequent misspellings
#[rustfmt::skip]
const WORD_VARIATIONS: &[(&str, &[&str])] = &[
    // Clothing
    ("майка", &["майки", "майку", "майкой", "майке", "майками", "майкам", "майках", "маика", "маики"]),
    ("футболка", &["футболки", "футболку", "футболкой", "футболке", "футболками", "футболкам", "футболках", "фудболка"]),
    ("рубашка", &["рубашки", "рубашку", "рубашкой", "рубашке", "рубашками", "рубашкам", "рубашках", "рубажка"]),
    ("брюки", &["брюк", "брюкам", "брюками", "брюках", "бруки"]),
    ("джинсы", &["джинс", "джинсам", "джинсами", "джинсах", "жинсы"]),
    ("платье", &["платья", "платью", "платьем", "платьями", "платьям", "платьях"]),
    ("костюм", &["костюмы", "костюму", "костюмом", "костюмами", "костюмам", "костюмах"]),
    ("пиджак", &["пиджаки", "пиджаком", "пиджаку", "пиджаками", "пиджакам", "пиджаках"]),
    ("куртка", &["куртки", "куртку", "курткой", "куртками", "курткам", "куртках"]),
    ("шорты", &["шорт", "шортам", "шортами", "шортах"]),
    ("юбка", &["юбки", "юбку", "юбкой", "юбками", "юбкам", "юбках"]),
    // Fruit and vegetables
    ("слива", &["сливы", "сливу", "сливой", "сливе", "сливами", "сливам", "сливах", "сливи"]),
    ("абрикос", &["абрикосы", "абрикосу", "абрикосом", "абрикосами", "абрикосам", "абрикосах"]),
    ("вишня", &["вишни", "вишню", "вишней", "вишне", "вишнями", "вишням", "вишнях"]),
    ("черешня", &["черешни", "черешню", "черешней", "черешне", "черешнями", "черешням", "черешнях"]),
    ("персик", &["персики", "персику", "персиком", "персиками", "персикам", "персиках"]),
    ("яблоко", &["яблоки", "яблоку", "яблоком", "яблоками", "яблокам", "яблоках", "яблок", "яблако", "яблочки"]),
    ("груша", &["груши", "грушу", "грушей", "груше", "грушами", "грушам", "грушах", "грушки"]),
    ("апельсин", &["апельсины", "апельсину", "апельсином", "апельсинами", "апельсинам", "апельсинах", "апелсин", "апельсинов"]),
    ("банан", &["бананы", "банану", "бананом", "бананами", "бананам", "бананах", "банани", "бананов"]),
    ("лимон", &["лимоны", "лимону", "лимоном", "лимонами", "лимонам", "лимонах"]),
    ("морковь", &["моркови", "морковью", "морковями", "морковям", "морковях", "морков", "марковь", "морковка"]),
    ("картофель", &["картофеля", "картофелю", "картофелем", "картофелями", "картофелям", "картофелях", "картофел", "картошка"]),
    ("огурец", &["огурцы", "огурцу", "огурцом", "огурцами", "огурцам", "огурцах", "огурци", "огурцов", "огурчики"]),
    ("помидор", &["помидоры", "помидору", "помидором", "помидорами", "помидорам", "помидорах", "помидори", "томат", "томаты"]),
    ("капуста", &["капусты", "капусту", "капустой", "капусте", "капустами", "капустам", "капустах"]),
    ("лук", &["луку", "луком", "луками", "лукам", "луках"]),
    ("чеснок", &["чесноку", "чесноком", "чеснокам", "чесноках"]),
    ("свекла", &["свеклы", "свеклу", "свеклой", "свекле", "свеклами", "свеклам", "свеклах", "свёкла"]),
    ("арбуз", &["арбузы", "арбузу", "арбузом", "арбузами", "арбузам", "арбузах"]),
    ("дыня", &["дыни", "дыню", "дыней", "дыне", "дынями", "дыням", "дынях"]),
    // Common descriptors
    ("свежий", &["свежие", "свежее", "свежая", "свижий", "свежый"]),
    ("хлопок", &["хлопка", "хлопак", "хлопковый"]),
    ("шерсть", &["шерсти", "шерст", "шерстяной"]),
];

pub fn default_administrative_terms() -> Vec<String> {
    ADMINISTRATIVE_TERMS.iter().map(|term| (*term).to_string()).collect()
}

pub fn default_word_variations() -> BTreeMap<String, Vec<String>> {
    WORD_VARIATIONS
        .iter()
        .map(|(base, variants)| {
            (
                (*base).to_string(),
                variants.iter().map(|variant| (*variant).to_string()).collect(),
            )
        })
        .collect()
}

/// First variant claimed by two different bases, as `(variant, first, second)`
pub fn conflicting_variation(
    variations: &BTreeMap<String, Vec<String>>,
) -> Option<(String, String, String)> {
    let mut owners: BTreeMap<&str, &str> = BTreeMap::new();
    for (base, variants) in variations {
        for variant in variants.iter().chain(std::iter::once(base)) {
            if let Some(owner) = owners.insert(variant.as_str(), base.as_str())
                && owner != base.as_str()
            {
                return Some((variant.clone(), owner.to_string(), base.clone()));
            }
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_tables_are_consistent() {
        assert!(conflicting_variation(&default_word_variations()).is_none());
        assert!(default_administrative_terms().contains(&"тн вэд".to_string()));
    }

    #[test]
    fn test_variant_claimed_twice_is_reported() {
        let mut variations = BTreeMap::new();
        variations.insert("помидор".to_string(), vec!["томаты".to_string()]);
        variations.insert("томат".to_string(), vec!["томаты".to_string()]);

        assert_eq!(
            conflicting_variation(&variations),
            Some((
                "томаты".to_string(),
                "помидор".to_string(),
                "томат".to_string()
            ))
        );
    }

    #[test]
    fn test_base_listed_under_another_base_conflicts() {
        let mut variations = BTreeMap::new();
        variations.insert("помидор".to_string(), vec!["томат".to_string()]);
        variations.insert("томат".to_string(), vec!["томаты".to_string()]);

        assert!(conflicting_variation(&variations).is_some());
    }
}
