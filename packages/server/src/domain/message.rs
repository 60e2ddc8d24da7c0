//! Bytes the server writes to chat clients.
//!
//! Names and chat payloads are relayed exactly as the clients sent them, so every
//! builder here works on bytes.

/// Sent to every new connection before anything else.
pub const NAME_PROMPT: &str = "Ingrese su nombre: ";

/// Reply to `@h`.
pub const HELP_TEXT: &str = "Comandos disponibles:\n\
    @usuarios - Lista de usuarios conectados\n\
    @conexion - Muestra la conexión y el número de usuarios\n\
    @salir - Desconectar del chat\n";

pub fn join_notice(name: &[u8]) -> Vec<u8> {
    [name, b" se ha conectado al chat.\n".as_slice()].concat()
}

pub fn leave_notice(name: &[u8]) -> Vec<u8> {
    [name, b" se ha desconectado del chat.\n".as_slice()].concat()
}

/// Chat payloads are relayed verbatim behind the sender's name.
pub fn chat_line(name: &[u8], payload: &[u8]) -> Vec<u8> {
    [name, b": ".as_slice(), payload].concat()
}

/// Reply to `@usuarios`, one name per line in join order.
pub fn user_list<S: AsRef<[u8]>>(names: &[S]) -> Vec<u8> {
    let mut reply = b"Usuarios conectados:\n".to_vec();
    for name in names {
        reply.extend_from_slice(name.as_ref());
        reply.push(b'\n');
    }
    reply
}

/// Reply to `@conexion`.
pub fn connection_info(count: usize) -> Vec<u8> {
    format!("Número de usuarios conectados: {}\n", count).into_bytes()
}
