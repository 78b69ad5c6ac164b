pub(crate) trait CharExt {
    fn is_ident_start(&self) -> bool;
    fn is_ident_part(&self) -> bool;
}

impl CharExt for char {
    fn is_ident_start(&self) -> bool {
        *self == '_' || self.is_alphabetic()
    }

    fn is_ident_part(&self) -> bool {
        *self == '_' || self.is_alphanumeric()
    }
}

impl CharExt for Option<char> {
    fn is_ident_start(&self) -> bool {
        self.map_or(false, |ch| ch.is_ident_start())
    }

    fn is_ident_part(&self) -> bool {
        self.map_or(false, |ch| ch.is_ident_part())
    }
}
