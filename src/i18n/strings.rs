/// All localized user-facing strings rendered by the server itself.
///
/// Page copy lives in the JSON content store; these are the few strings the
/// server needs even when the content store has nothing for a locale.
#[derive(Debug, Clone)]
pub struct LocaleStrings {
    // ==================== Fallback ====================
    /// Notice shown above an article served in the canonical language.
    /// Empty for the canonical locale itself, which never falls back.
    pub fallback_notice: &'static str,

    // ==================== Not Found ====================
    pub not_found_title: &'static str,
    pub not_found_body: &'static str,
    pub back_home: &'static str,

    // ==================== Navigation defaults ====================
    pub home: &'static str,
    pub resources: &'static str,
    pub articles: &'static str,

    // ==================== Article chrome ====================
    pub references: &'static str,
    pub faq: &'static str,
    pub by: &'static str,
    pub published: &'static str,
    pub last_updated: &'static str,
    /// Placeholders: {minutes}
    pub reading_time: &'static str,

    // ==================== Contact ====================
    pub contact_success: &'static str,
    pub contact_error: &'static str,
    pub contact_required: &'static str,
    pub contact_invalid_email: &'static str,
    /// Placeholders: {max}
    pub contact_max_length: &'static str,
    pub contact_consent: &'static str,
}

// ==================== French Strings (canonical) ====================

pub const FRENCH_STRINGS: LocaleStrings = LocaleStrings {
    fallback_notice: "",

    not_found_title: "Page introuvable",
    not_found_body: "La page que vous cherchez n'existe pas ou a été déplacée.",
    back_home: "Retour à l'accueil",

    home: "Accueil",
    resources: "Ressources",
    articles: "Articles",

    references: "Références",
    faq: "Questions fréquentes",
    by: "Par",
    published: "Publié le",
    last_updated: "Mis à jour le",
    reading_time: "Temps de lecture : {minutes} min",

    contact_success: "Merci ! Votre message a bien été envoyé.",
    contact_error: "L'envoi a échoué. Veuillez réessayer plus tard.",
    contact_required: "Ce champ est obligatoire.",
    contact_invalid_email: "Adresse e-mail invalide.",
    contact_max_length: "{max} caractères maximum.",
    contact_consent: "Votre consentement est requis.",
};

// ==================== English Strings ====================

pub const ENGLISH_STRINGS: LocaleStrings = LocaleStrings {
    fallback_notice: "Content temporarily shown in French until the translation is ready.",

    not_found_title: "Page not found",
    not_found_body: "The page you are looking for does not exist or has moved.",
    back_home: "Back to home",

    home: "Home",
    resources: "Resources",
    articles: "Articles",

    references: "References",
    faq: "Frequently asked questions",
    by: "By",
    published: "Published",
    last_updated: "Last updated",
    reading_time: "Reading time: {minutes} min",

    contact_success: "Thank you! Your message has been sent.",
    contact_error: "Sending failed. Please try again later.",
    contact_required: "This field is required.",
    contact_invalid_email: "Invalid email address.",
    contact_max_length: "{max} characters maximum.",
    contact_consent: "Your consent is required.",
};

// ==================== German Strings ====================

pub const GERMAN_STRINGS: LocaleStrings = LocaleStrings {
    fallback_notice:
        "Inhalt vorübergehend auf Französisch angezeigt, bis die Übersetzung verfügbar ist.",

    not_found_title: "Seite nicht gefunden",
    not_found_body: "Die gesuchte Seite existiert nicht oder wurde verschoben.",
    back_home: "Zur Startseite",

    home: "Startseite",
    resources: "Ressourcen",
    articles: "Artikel",

    references: "Quellen",
    faq: "Häufige Fragen",
    by: "Von",
    published: "Veröffentlicht am",
    last_updated: "Zuletzt aktualisiert",
    reading_time: "Lesezeit: {minutes} Min.",

    contact_success: "Danke! Ihre Nachricht wurde gesendet.",
    contact_error: "Senden fehlgeschlagen. Bitte versuchen Sie es später erneut.",
    contact_required: "Dieses Feld ist erforderlich.",
    contact_invalid_email: "Ungültige E-Mail-Adresse.",
    contact_max_length: "Maximal {max} Zeichen.",
    contact_consent: "Ihre Zustimmung ist erforderlich.",
};

// ==================== Spanish Strings ====================

pub const SPANISH_STRINGS: LocaleStrings = LocaleStrings {
    fallback_notice:
        "Contenido mostrado temporalmente en francés mientras se prepara la traducción.",

    not_found_title: "Página no encontrada",
    not_found_body: "La página que busca no existe o ha sido movida.",
    back_home: "Volver al inicio",

    home: "Inicio",
    resources: "Recursos",
    articles: "Artículos",

    references: "Referencias",
    faq: "Preguntas frecuentes",
    by: "Por",
    published: "Publicado el",
    last_updated: "Última actualización",
    reading_time: "Tiempo de lectura: {minutes} min",

    contact_success: "¡Gracias! Su mensaje ha sido enviado.",
    contact_error: "El envío ha fallado. Inténtelo de nuevo más tarde.",
    contact_required: "Este campo es obligatorio.",
    contact_invalid_email: "Dirección de correo no válida.",
    contact_max_length: "{max} caracteres como máximo.",
    contact_consent: "Se requiere su consentimiento.",
};

// ==================== Portuguese Strings ====================

pub const PORTUGUESE_STRINGS: LocaleStrings = LocaleStrings {
    fallback_notice:
        "Conteúdo exibido temporariamente em francês enquanto a tradução é preparada.",

    not_found_title: "Página não encontrada",
    not_found_body: "A página que procura não existe ou foi movida.",
    back_home: "Voltar ao início",

    home: "Início",
    resources: "Recursos",
    articles: "Artigos",

    references: "Referências",
    faq: "Perguntas frequentes",
    by: "Por",
    published: "Publicado em",
    last_updated: "Última atualização",
    reading_time: "Tempo de leitura: {minutes} min",

    contact_success: "Obrigado! A sua mensagem foi enviada.",
    contact_error: "O envio falhou. Tente novamente mais tarde.",
    contact_required: "Este campo é obrigatório.",
    contact_invalid_email: "Endereço de e-mail inválido.",
    contact_max_length: "Máximo de {max} caracteres.",
    contact_consent: "O seu consentimento é necessário.",
};
