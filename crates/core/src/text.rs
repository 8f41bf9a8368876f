//! Bereinigung von Benutzereingaben

/// Entfernt Leerraum an den Raendern und kuerzt auf `max` Zeichen
///
/// Gekuerzt wird nach Unicode-Zeichen, nicht nach Bytes. Ein leeres
/// Ergebnis bedeutet, dass die Eingabe verworfen werden muss.
pub fn bereinigen(roh: &str, max: usize) -> String {
    roh.trim().chars().take(max).collect()
}
