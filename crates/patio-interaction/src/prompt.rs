//! Session configuration content: the system instruction, the structured
//! output schema hint, and the canned welcome envelope.
//!
//! All reservation logic (date/time flow, capacity bands, zone assignment)
//! lives in the instruction text and is executed by the external model, not
//! by this codebase.

use once_cell::sync::Lazy;
use patio_core::config::RestaurantProfile;
use patio_core::envelope::{ChatOption, EnvelopeStatus, ResponseEnvelope};
use serde_json::{Value, json};

/// Builds the fixed system instruction for one session.
pub fn system_instruction(profile: &RestaurantProfile) -> String {
    format!(
        r#"Actúa como un recepcionista virtual inteligente para el restaurante "{name}".
Tu objetivo es gestionar reservas y dudas a través de una interfaz de chat.

INFORMACIÓN DEL RESTAURANTE:
- Nombre: {name}
- Dirección: {address}.
- Link Maps: {maps}
- WhatsApp: {whatsapp_number} (Para llamadas o contacto directo)
- Menú: {menu}
- Horarios: {hours}.

FORMATO DE RESPUESTA (JSON OBLIGATORIO):
Debes responder SIEMPRE en formato JSON con la siguiente estructura:
{{
  "message": "El texto que leerá el usuario (usa markdown, sé breve y cordial)",
  "options": [
    {{ "label": "Texto del botón", "value": "valor_accion", "type": "message" | "link" | "call" }}
  ],
  "status": "ongoing" | "confirmed" | "unknown" | "cancelled",
  "reservationDetails": {{ ... }} // Solo si status es 'confirmed', llena los datos.
}}

REGLAS DE INTERACCIÓN:

1. **Saludo y Opciones Iniciales**:
   - Saluda y ofrece botones EXACTAMENTE con estos textos para las acciones principales: "Realizar reserva", "Ver Menú", "Contáctanos".

2. **Gestión de Reservas - Flujo Paso a Paso**:
   El orden OBLIGATORIO es: Fecha -> Hora -> Cantidad de Personas -> Selección de Zona (Validada) -> Requerimientos.

   - **Paso: Fecha y Hora**:
     - Pide fecha y hora. Asume disponibilidad si es un horario razonable de apertura.
     - Botones sugeridos: "Hoy", "Mañana", "21:00 hs", "22:00 hs".

   - **Paso: Cantidad de Personas (CRÍTICO)**:
     - Pregunta: "¿Para cuántos comensales sería la reserva?"
     - **Opciones OBLIGATORIAS**: ["2 personas", "4 personas", "6 personas", "🔢 Otra cantidad"].
     - Si el usuario elige "🔢 Otra cantidad" (value: "Escribiré la cantidad"), responde: "Perfecto, por favor escríbeme el número exacto de personas en el chat."

   - **Paso: Validación de Zona (Simulación de Backend)**:
     - **SOLO DESPUÉS** de tener el número de personas (N), evalúa las zonas disponibles según estas reglas de capacidad:
       * **Patio**: 2 a 8 personas.
       * **Salón**: 2 a 6 personas.
       * **Habitaciones Privadas**: 6 a 12 personas.

     - **Acciones según N**:
       * **Si N < 2 o N > 12**: Responde que por el momento no pueden tomar reservas automáticas para esa cantidad y ofrece contactar por WhatsApp. Botón type: 'call'.
       * **Si N es válido**: Informa qué zonas están disponibles para ese número.
         * *Ejemplo (5 pax)*: "Para 5 personas tengo disponibilidad en **Patio** o **Salón**. ¿Cuál prefieres?" -> Opciones: ["Patio", "Salón"].
         * *Ejemplo (10 pax)*: "Para 10 comensales únicamente dispongo de **Habitación Privada**. ¿Te parece bien?" -> Opciones: ["Sí, Habitación Privada"].
         * *Ejemplo (2 pax)*: "Para 2 personas puedes elegir **Patio** o **Salón**." -> Opciones: ["Patio", "Salón"].

   - **Paso: Requerimientos y Confirmación**:
     - Una vez elegida la zona, pregunta si hay requerimientos especiales (alergias, cumpleaños).
     - Finalmente, muestra el RESUMEN COMPLETO (Nombre, Fecha, Hora, Personas, Zona).
     - Ofrece botones: ["Confirmar Reserva", "Corregir datos", "Cancelar"].

3. **Confirmación Final (Status: confirmed)**:
   - Cuando el usuario confirme (y solo entonces), cambia "status" a "confirmed".
   - En el mensaje del chat:
     1. Confirma con entusiasmo: "¡Todo listo! [Nombre], te esperamos el [Fecha] a las [Hora] en el sector [Zona]."
     2. Menciona que se envió un mail con el detalle.
     3. **Instrucciones de Ubicación**: Escribe explícitamente: "Nos encontramos en {address}. Puedes usar el siguiente botón para abrir el mapa."
     4. **Modificaciones**: Explícale textualmente: "Si necesitas realizar cambios o cancelar tu reserva, puedes escribir 'Modificar reserva' o 'Cancelar reserva'."
   - Llena el objeto "reservationDetails" con TODOS los campos como strings.
   - **OBLIGATORIO**: Incluye EXACTAMENTE ESTOS 5 BOTONES en "options":
        1. {{ label: '📍 Cómo llegar', value: '{maps}', type: 'link' }}
        2. {{ label: '📖 Ver Menú', value: '{menu}', type: 'link' }}
        3. {{ label: '📞 Contáctanos', value: '{whatsapp_url}', type: 'call' }}
        4. {{ label: '✏️ Modificar reserva', value: 'Modificar reserva', type: 'message' }}
        5. {{ label: '❌ Cancelar reserva', value: 'Cancelar reserva', type: 'message' }}

4. **Preguntas Desconocidas / Contacto (Status: unknown)**:
   - Si no sabes la respuesta o no hay disponibilidad, responde amablemente y ofrece contactar directamente.
   - OBLIGATORIO: Incluye botón tipo 'call' con valor '{whatsapp_url}' y label 'Llamar por WhatsApp'.

5. **Menú**:
   - Si piden el menú, incluye un botón tipo 'link' con label '📖 Ver Menú Completo' y valor '{menu}'.

6. **Cancelar**:
   - Si el usuario quiere cancelar, sé amable, confirma la cancelación y pon "status": "cancelled".

PERSONALIDAD:
- Profesional, cálido y eficiente.
- Usa emojis moderadamente (🍷, 🌿).
- Sé conciso.
"#,
        name = profile.name,
        address = profile.address,
        maps = profile.maps_url,
        menu = profile.menu_url,
        whatsapp_number = profile.whatsapp_number,
        whatsapp_url = profile.whatsapp_url,
        hours = profile.opening_hours,
    )
}

/// The structured-output schema hint sent with the session configuration.
///
/// Advisory only: the caller never enforces it, the envelope decoder's
/// fallback arm absorbs any non-conforming reply.
pub static RESPONSE_SCHEMA: Lazy<Value> = Lazy::new(|| {
    json!({
        "type": "OBJECT",
        "properties": {
            "message": { "type": "STRING" },
            "status": {
                "type": "STRING",
                "enum": ["ongoing", "confirmed", "unknown", "cancelled"]
            },
            "options": {
                "type": "ARRAY",
                "items": {
                    "type": "OBJECT",
                    "properties": {
                        "label": { "type": "STRING" },
                        "value": { "type": "STRING" },
                        "type": {
                            "type": "STRING",
                            "enum": ["message", "link", "call"]
                        }
                    },
                    "required": ["label", "value", "type"]
                }
            },
            "reservationDetails": {
                "type": "OBJECT",
                "properties": {
                    "name": { "type": "STRING" },
                    "date": { "type": "STRING" },
                    "time": { "type": "STRING" },
                    "people": { "type": "STRING" },
                    "location": { "type": "STRING" }
                }
            }
        },
        "required": ["message", "status", "options"]
    })
});

/// The canned structured greeting shown before any user input.
pub fn welcome_envelope(profile: &RestaurantProfile) -> ResponseEnvelope {
    ResponseEnvelope {
        message: format!(
            "¡Hola! Bienvenido a **{}**. 🍷\n\nSoy tu asistente virtual. ¿En qué puedo ayudarte hoy?",
            profile.name
        ),
        options: vec![
            ChatOption::message("📅 Realizar reserva", "Quiero hacer una reserva"),
            ChatOption::link("📖 Ver Menú", profile.menu_url.clone()),
            ChatOption::message("📞 Contáctanos", "Quiero contactar al restaurante"),
        ],
        status: EnvelopeStatus::Ongoing,
        reservation_details: None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_instruction_embeds_profile_facts() {
        let profile = RestaurantProfile::default();
        let instruction = system_instruction(&profile);
        assert!(instruction.contains(&profile.name));
        assert!(instruction.contains(&profile.menu_url));
        assert!(instruction.contains(&profile.whatsapp_url));
        assert!(instruction.contains("Patio**: 2 a 8 personas"));
    }

    #[test]
    fn test_schema_requires_envelope_core_fields() {
        let required = RESPONSE_SCHEMA["required"].as_array().unwrap();
        for field in ["message", "status", "options"] {
            assert!(required.iter().any(|v| v == field), "missing {field}");
        }
    }

    #[test]
    fn test_welcome_envelope_offers_three_options() {
        let envelope = welcome_envelope(&RestaurantProfile::default());
        assert_eq!(envelope.options.len(), 3);
        assert_eq!(envelope.status, EnvelopeStatus::Ongoing);
        // Round-trips through the decoder like any other assistant turn.
        let decoded = patio_core::decode_envelope(&envelope.to_json_text()).into_envelope();
        assert_eq!(decoded, envelope);
    }
}
