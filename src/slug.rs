/// URL slug for a category or product name: lowercase ASCII, accents folded,
/// words joined by `-`.
pub fn slugify(name: &str) -> String {
    let mut slug = String::with_capacity(name.len());
    let mut pending_dash = false;
    for ch in name.chars().flat_map(char::to_lowercase) {
        let folded = fold_accent(ch);
        if folded.is_ascii_alphanumeric() {
            if pending_dash && !slug.is_empty() {
                slug.push('-');
            }
            pending_dash = false;
            slug.push(folded);
        } else {
            pending_dash = true;
        }
    }
    slug
}

fn fold_accent(ch: char) -> char {
    match ch {
        'á' | 'à' | 'â' | 'ã' | 'ä' => 'a',
        'é' | 'è' | 'ê' | 'ë' => 'e',
        'í' | 'ì' | 'î' | 'ï' => 'i',
        'ó' | 'ò' | 'ô' | 'õ' | 'ö' => 'o',
        'ú' | 'ù' | 'û' | 'ü' => 'u',
        'ç' => 'c',
        'ñ' => 'n',
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::slugify;

    #[test]
    fn folds_portuguese_accents() {
        assert_eq!(slugify("Enxoval de Maternidade"), "enxoval-de-maternidade");
        assert_eq!(slugify("Toalhas & Fraldas Bordadas"), "toalhas-fraldas-bordadas");
        assert_eq!(slugify("  Decoração  Quarto!  "), "decoracao-quarto");
        assert_eq!(slugify("Kit Bebê Nº 2"), "kit-bebe-n-2");
    }

    #[test]
    fn empty_when_nothing_usable() {
        assert_eq!(slugify("!!!"), "");
    }
}
